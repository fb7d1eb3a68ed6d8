//! Invite lifecycle
//!
//! An invite row exists only while the invite is pending. Accepting,
//! declining, and cancelling all delete it, so none of them can happen twice.

use std::sync::Arc;

use ranko_common::db::{Invite, Membership};
use ranko_common::Store;
use tracing::{debug, info};

use crate::error::{surface, DomainError, DomainResult, Entity};
use crate::gate::Gate;
use crate::notify::{Notification, Notifier};
use crate::validation::normalize_email;

#[derive(Clone)]
pub struct InviteManager {
    store: Arc<dyn Store>,
    gate: Gate,
    notifier: Notifier,
}

impl InviteManager {
    pub fn new(store: Arc<dyn Store>, notifier: Notifier) -> Self {
        Self {
            gate: Gate::new(Arc::clone(&store)),
            store,
            notifier,
        }
    }

    /// Invite `email` into a ranking on behalf of one of its members
    ///
    /// # Errors
    /// - `NotFound(Ranking)` / `NotAuthorized`: ranking missing or inviter not a member
    /// - `AlreadyMember`: the address belongs to an account already in the ranking
    /// - `DuplicateInvite`: an invite for this address is already pending
    pub async fn create_invite(
        &self,
        ranking_id: &str,
        email: &str,
        inviter_id: &str,
    ) -> DomainResult<Invite> {
        surface("create_invite", self.notifier.messages(), async {
            let email = normalize_email(email)?;

            let (ranking, inviter, _) = tokio::try_join!(
                self.gate.require_ranking(ranking_id),
                self.gate.require_user(inviter_id),
                self.gate.require_membership(ranking_id, inviter_id),
            )?;

            if let Some(existing) = self.store.get_user_by_email(&email).await? {
                if self
                    .store
                    .get_membership(ranking_id, &existing.id)
                    .await?
                    .is_some()
                {
                    return Err(DomainError::AlreadyMember);
                }
            }

            if self.store.pending_invite(ranking_id, &email).await?.is_some() {
                return Err(DomainError::DuplicateInvite);
            }

            let invite = match self.store.create_invite(ranking_id, &email, inviter_id).await {
                Ok(invite) => invite,
                // Lost a race with a concurrent invite for the same address
                Err(e) if e.is_conflict() => return Err(DomainError::DuplicateInvite),
                Err(e) => return Err(e.into()),
            };

            info!(
                "Invite {} created for {} in ranking {} by {}",
                invite.id, email, ranking_id, inviter_id
            );

            self.notifier
                .notify_email(
                    &email,
                    Notification::InviteReceived {
                        ranking: ranking.name,
                        inviter: inviter.name,
                    },
                )
                .await;

            Ok(invite)
        })
        .await
    }

    /// Join the ranking through a pending invite
    ///
    /// Membership creation and invite deletion commit together. Re-running an
    /// acceptance whose membership already exists completes it instead of
    /// failing, so a retry after an interrupted attempt is safe.
    pub async fn accept_invite(&self, invite_id: &str, user_id: &str) -> DomainResult<Membership> {
        surface("accept_invite", self.notifier.messages(), async {
            let (invite, user) = self.load_for_invitee(invite_id, user_id).await?;
            let ranking = self.gate.require_ranking(&invite.ranking_id).await?;

            if self
                .store
                .get_membership(&invite.ranking_id, user_id)
                .await?
                .is_some()
            {
                info!(
                    "User {} already in ranking {}; consuming invite {}",
                    user_id, invite.ranking_id, invite.id
                );
            }

            let membership = match self.store.accept_invite(&invite, user_id).await {
                Ok(membership) => membership,
                Err(ranko_common::Error::NotFound(_)) => {
                    return Err(DomainError::NotFound(Entity::Invite))
                }
                Err(e) => return Err(e.into()),
            };

            self.notifier
                .notify_members(
                    &invite.ranking_id,
                    user_id,
                    Notification::MemberJoined {
                        ranking: ranking.name,
                        member: user.name,
                    },
                )
                .await;

            Ok(membership)
        })
        .await
    }

    pub async fn decline_invite(&self, invite_id: &str, user_id: &str) -> DomainResult<()> {
        surface("decline_invite", self.notifier.messages(), async {
            let (invite, _user) = self.load_for_invitee(invite_id, user_id).await?;

            if !self.store.delete_invite(&invite.id).await? {
                return Err(DomainError::NotFound(Entity::Invite));
            }
            info!("Invite {} declined by {}", invite.id, user_id);

            match self.store.get_ranking(&invite.ranking_id).await? {
                Some(ranking) if !ranking.is_deleted() => {
                    self.notifier
                        .notify_members(
                            &invite.ranking_id,
                            user_id,
                            Notification::InviteDeclined {
                                ranking: ranking.name,
                                invitee: invite.email,
                            },
                        )
                        .await;
                }
                _ => debug!("Ranking {} gone; skipping decline notice", invite.ranking_id),
            }

            Ok(())
        })
        .await
    }

    /// Withdraw a pending invite; allowed for the inviter and for any member
    pub async fn cancel_invite(&self, invite_id: &str, user_id: &str) -> DomainResult<()> {
        surface("cancel_invite", self.notifier.messages(), async {
            let invite = self.require_invite(invite_id).await?;

            if invite.inviter_id != user_id {
                match self.gate.require_membership(&invite.ranking_id, user_id).await {
                    Ok(_) => {}
                    Err(DomainError::NotAuthorized) => {
                        return Err(DomainError::validation(
                            "only the inviter or a ranking member can cancel an invite",
                        ))
                    }
                    Err(e) => return Err(e),
                }
            }

            if !self.store.delete_invite(&invite.id).await? {
                return Err(DomainError::NotFound(Entity::Invite));
            }
            info!("Invite {} cancelled by {}", invite.id, user_id);

            Ok(())
        })
        .await
    }

    pub async fn list_invites_by_email(&self, email: &str) -> DomainResult<Vec<Invite>> {
        surface("list_invites_by_email", self.notifier.messages(), async {
            let email = normalize_email(email)?;
            Ok(self.store.list_invites_by_email(&email).await?)
        })
        .await
    }

    pub async fn list_invites_by_ranking(
        &self,
        ranking_id: &str,
        user_id: &str,
    ) -> DomainResult<Vec<Invite>> {
        surface("list_invites_by_ranking", self.notifier.messages(), async {
            self.gate.require_member_ranking(ranking_id, user_id).await?;
            Ok(self.store.list_invites_by_ranking(ranking_id).await?)
        })
        .await
    }

    async fn require_invite(&self, invite_id: &str) -> DomainResult<Invite> {
        self.store
            .get_invite(invite_id)
            .await?
            .ok_or(DomainError::NotFound(Entity::Invite))
    }

    /// The invite plus the acting account, which must own the invited address
    async fn load_for_invitee(
        &self,
        invite_id: &str,
        user_id: &str,
    ) -> DomainResult<(Invite, ranko_common::db::User)> {
        let invite = self.require_invite(invite_id).await?;
        let user = self.gate.require_user(user_id).await?;

        if user.email != invite.email {
            return Err(DomainError::EmailMismatch);
        }
        Ok((invite, user))
    }
}
