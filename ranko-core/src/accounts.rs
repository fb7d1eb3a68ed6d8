//! Minimal account registry
//!
//! Authentication is handled elsewhere; the engine only needs accounts to
//! exist with a normalized email and, optionally, a push destination.

use std::sync::Arc;

use ranko_common::db::{PublicProfile, User};
use ranko_common::Store;
use tracing::info;

use crate::error::{surface, DomainError, DomainResult};
use crate::gate::Gate;
use crate::locale::Messages;
use crate::validation::{normalize_email, optional_text, require_text};

#[derive(Clone)]
pub struct Accounts {
    store: Arc<dyn Store>,
    gate: Gate,
    messages: Messages,
}

impl Accounts {
    pub fn new(store: Arc<dyn Store>, messages: Messages) -> Self {
        Self {
            gate: Gate::new(Arc::clone(&store)),
            store,
            messages,
        }
    }

    pub async fn register_user(
        &self,
        email: &str,
        name: &str,
        push_destination: Option<&str>,
    ) -> DomainResult<User> {
        surface("register_user", &self.messages, async {
            let email = normalize_email(email)?;
            let name = require_text("name", name)?;
            let destination = optional_text(push_destination);

            match self
                .store
                .create_user(&email, &name, destination.as_deref())
                .await
            {
                Ok(user) => {
                    info!("Registered user {} <{}>", user.id, user.email);
                    Ok(user)
                }
                Err(e) if e.is_conflict() => Err(DomainError::validation(
                    "an account with this email already exists",
                )),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    /// Set or clear the device token push notifications go to
    pub async fn set_push_destination(
        &self,
        user_id: &str,
        destination: Option<&str>,
    ) -> DomainResult<()> {
        surface("set_push_destination", &self.messages, async {
            self.gate.require_user(user_id).await?;
            let destination = optional_text(destination);
            Ok(self
                .store
                .set_push_destination(user_id, destination.as_deref())
                .await?)
        })
        .await
    }

    pub async fn profile(&self, user_id: &str) -> DomainResult<PublicProfile> {
        surface("profile", &self.messages, async {
            Ok(self.gate.require_user(user_id).await?.profile())
        })
        .await
    }
}
