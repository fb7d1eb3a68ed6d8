//! Validation gate: existence and membership checks
//!
//! Read-only. `require_membership` is the authorization primitive every
//! ranking-scoped operation goes through before touching state.

use std::sync::Arc;

use ranko_common::db::{Criteria, Item, Membership, Ranking, User};
use ranko_common::Store;

use crate::error::{DomainError, DomainResult, Entity};

#[derive(Clone)]
pub struct Gate {
    store: Arc<dyn Store>,
}

impl Gate {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Unknown or blank user ids are an authorization failure, not a lookup miss
    pub async fn require_user(&self, user_id: &str) -> DomainResult<User> {
        if user_id.trim().is_empty() {
            return Err(DomainError::NotAuthorized);
        }
        self.store
            .get_user(user_id)
            .await?
            .ok_or(DomainError::NotAuthorized)
    }

    /// Soft-deleted rankings count as missing
    pub async fn require_ranking(&self, ranking_id: &str) -> DomainResult<Ranking> {
        match self.store.get_ranking(ranking_id).await? {
            Some(ranking) if !ranking.is_deleted() => Ok(ranking),
            _ => Err(DomainError::NotFound(Entity::Ranking)),
        }
    }

    pub async fn require_membership(
        &self,
        ranking_id: &str,
        user_id: &str,
    ) -> DomainResult<Membership> {
        if user_id.trim().is_empty() {
            return Err(DomainError::NotAuthorized);
        }
        self.store
            .get_membership(ranking_id, user_id)
            .await?
            .ok_or(DomainError::NotAuthorized)
    }

    pub async fn require_item(&self, item_id: &str) -> DomainResult<Item> {
        self.store
            .get_item(item_id)
            .await?
            .ok_or(DomainError::NotFound(Entity::Item))
    }

    pub async fn require_criteria(&self, criteria_id: &str) -> DomainResult<Criteria> {
        self.store
            .get_criteria(criteria_id)
            .await?
            .ok_or(DomainError::NotFound(Entity::Criteria))
    }

    /// Membership and ranking existence together, membership first so that
    /// outsiders cannot probe which ranking ids exist
    pub async fn require_member_ranking(
        &self,
        ranking_id: &str,
        user_id: &str,
    ) -> DomainResult<Ranking> {
        self.require_membership(ranking_id, user_id).await?;
        self.require_ranking(ranking_id).await
    }
}
