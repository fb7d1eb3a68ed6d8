//! Domain error taxonomy
//!
//! Every public engine operation returns `DomainResult`. Known domain errors
//! pass through unchanged; storage and other unexpected failures are logged and
//! replaced by `Internal` carrying a localized, user-facing message.

use std::fmt;
use std::future::Future;

use thiserror::Error;
use tracing::error;

use crate::locale::Messages;

/// Entity kinds named by `DomainError::NotFound`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Ranking,
    Item,
    Criteria,
    Invite,
    User,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Ranking => "Ranking",
            Entity::Item => "Item",
            Entity::Criteria => "Criteria",
            Entity::Invite => "Invite",
            Entity::User => "User",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(Entity),

    /// Missing or unknown user, or the user is not a member of the ranking
    #[error("Not authorized")]
    NotAuthorized,

    #[error("User is already a member of this ranking")]
    AlreadyMember,

    #[error("An invite is already pending for this email")]
    DuplicateInvite,

    #[error("Invite email does not match the account email")]
    EmailMismatch,

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Unexpected failure; the message is safe to show to end users
    #[error("{0}")]
    Internal(String),
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;

impl DomainError {
    /// Stable machine-readable code for transport-layer mapping
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::NotFound(_) => "NOT_FOUND",
            DomainError::NotAuthorized => "NOT_AUTHORIZED",
            DomainError::AlreadyMember => "ALREADY_MEMBER",
            DomainError::DuplicateInvite => "DUPLICATE_INVITE",
            DomainError::EmailMismatch => "EMAIL_MISMATCH",
            DomainError::ValidationFailed(_) => "VALIDATION_FAILED",
            DomainError::Internal(_) => "INTERNAL",
        }
    }

    /// True for failures the client can correct (bad input, forbidden, not found)
    pub fn is_client_error(&self) -> bool {
        !matches!(self, DomainError::Internal(_))
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        DomainError::ValidationFailed(reason.into())
    }
}

impl From<ranko_common::Error> for DomainError {
    fn from(err: ranko_common::Error) -> Self {
        DomainError::Internal(err.to_string())
    }
}

/// Run one public operation, replacing internal failure detail with localized copy
pub(crate) async fn surface<T, F>(operation: &str, messages: &Messages, work: F) -> DomainResult<T>
where
    F: Future<Output = DomainResult<T>>,
{
    match work.await {
        Err(DomainError::Internal(detail)) => {
            error!("{} failed: {}", operation, detail);
            Err(DomainError::Internal(messages.operation_failed().to_string()))
        }
        other => other,
    }
}
