//! Best-effort notification fan-out
//!
//! Recipient lookup and delivery both run inside the dispatched task, so a
//! failure in either is logged and dropped. Nothing here returns an error to
//! the operation that triggered the notification.

mod sender;

pub use sender::{HttpPushSender, LogPushSender, PushError, PushMessage, PushSender};

use std::future::Future;
use std::sync::Arc;

use ranko_common::config::DispatchMode;
use ranko_common::Store;
use tracing::{debug, warn};

use crate::locale::Messages;

/// State changes that other users hear about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    InviteReceived { ranking: String, inviter: String },
    MemberJoined { ranking: String, member: String },
    InviteDeclined { ranking: String, invitee: String },
    ItemScored { ranking: String, item: String, scorer: String },
    ScoreUpdated { ranking: String, item: String, scorer: String },
}

impl Notification {
    fn label(&self) -> &'static str {
        match self {
            Notification::InviteReceived { .. } => "invite_received",
            Notification::MemberJoined { .. } => "member_joined",
            Notification::InviteDeclined { .. } => "invite_declined",
            Notification::ItemScored { .. } => "item_scored",
            Notification::ScoreUpdated { .. } => "score_updated",
        }
    }
}

#[derive(Clone)]
pub struct Notifier {
    store: Arc<dyn Store>,
    sender: Arc<dyn PushSender>,
    messages: Messages,
    mode: DispatchMode,
}

impl Notifier {
    pub fn new(
        store: Arc<dyn Store>,
        sender: Arc<dyn PushSender>,
        messages: Messages,
        mode: DispatchMode,
    ) -> Self {
        Self {
            store,
            sender,
            messages,
            mode,
        }
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Push to the account registered under `email`, if it has a destination
    pub async fn notify_email(&self, email: &str, notification: Notification) {
        let store = Arc::clone(&self.store);
        let sender = Arc::clone(&self.sender);
        let message = self.messages.render(&notification);
        let email = email.to_string();

        self.dispatch(notification.label(), async move {
            let destination = store
                .get_user_by_email(&email)
                .await?
                .and_then(|user| user.push_destination);

            match destination {
                Some(destination) => sender.send(&destination, &message).await,
                None => {
                    debug!("No push destination registered for {}", email);
                    Ok(())
                }
            }
        })
        .await;
    }

    /// Push to every member of the ranking except `exclude_user_id`
    pub async fn notify_members(
        &self,
        ranking_id: &str,
        exclude_user_id: &str,
        notification: Notification,
    ) {
        let store = Arc::clone(&self.store);
        let sender = Arc::clone(&self.sender);
        let message = self.messages.render(&notification);
        let ranking_id = ranking_id.to_string();
        let exclude_user_id = exclude_user_id.to_string();

        self.dispatch(notification.label(), async move {
            let destinations: Vec<String> = store
                .list_members(&ranking_id)
                .await?
                .into_iter()
                .filter(|member| member.id != exclude_user_id)
                .filter_map(|member| member.push_destination)
                .collect();

            if destinations.is_empty() {
                debug!("No members of ranking {} to notify", ranking_id);
                return Ok(());
            }
            sender.send_bulk(&destinations, &message).await
        })
        .await;
    }

    async fn dispatch<F>(&self, label: &'static str, delivery: F)
    where
        F: Future<Output = Result<(), PushError>> + Send + 'static,
    {
        let task = async move {
            if let Err(e) = delivery.await {
                warn!("Notification {} not delivered: {}", label, e);
            }
        };

        match self.mode {
            DispatchMode::Detached => {
                tokio::spawn(task);
            }
            DispatchMode::Inline => task.await,
        }
    }
}
