//! Persistence interface consumed by the ranking engine
//!
//! The engine only talks to storage through this trait. `SqliteStore` is the
//! shipped implementation; anything that honors the uniqueness and atomicity
//! notes below can stand in for it.

use async_trait::async_trait;

use super::models::*;
use crate::Result;

#[async_trait]
pub trait Store: Send + Sync {
    // Users

    /// Fails with `Error::Conflict` when the email is taken
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        push_destination: Option<&str>,
    ) -> Result<User>;
    async fn get_user(&self, id: &str) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn set_push_destination(&self, user_id: &str, destination: Option<&str>) -> Result<()>;

    // Rankings

    /// Creates the ranking and the owner's membership atomically
    async fn create_ranking(&self, owner_id: &str, data: &NewRanking) -> Result<Ranking>;
    /// Returns soft-deleted rankings too; callers decide visibility
    async fn get_ranking(&self, id: &str) -> Result<Option<Ranking>>;
    async fn update_ranking(&self, id: &str, patch: &RankingPatch) -> Result<Ranking>;
    async fn soft_delete_ranking(&self, id: &str) -> Result<()>;
    async fn list_rankings_for_user(&self, user_id: &str) -> Result<Vec<Ranking>>;

    // Memberships

    async fn get_membership(&self, ranking_id: &str, user_id: &str) -> Result<Option<Membership>>;
    /// Fails with `Error::Conflict` when the user already belongs to the ranking
    async fn add_membership(&self, user_id: &str, ranking_id: &str) -> Result<Membership>;
    async fn list_members(&self, ranking_id: &str) -> Result<Vec<User>>;

    // Invites

    /// Fails with `Error::Conflict` when a pending invite exists for (ranking, email)
    async fn create_invite(&self, ranking_id: &str, email: &str, inviter_id: &str)
        -> Result<Invite>;
    async fn get_invite(&self, id: &str) -> Result<Option<Invite>>;
    async fn pending_invite(&self, ranking_id: &str, email: &str) -> Result<Option<Invite>>;
    async fn list_invites_by_email(&self, email: &str) -> Result<Vec<Invite>>;
    async fn list_invites_by_ranking(&self, ranking_id: &str) -> Result<Vec<Invite>>;
    /// Returns false when no row was deleted
    async fn delete_invite(&self, id: &str) -> Result<bool>;
    /// Adds the membership (if missing) and deletes the invite in one transaction
    async fn accept_invite(&self, invite: &Invite, user_id: &str) -> Result<Membership>;

    // Criteria

    /// Fails with `Error::Conflict` when the ranking already has a criteria with that name
    async fn create_criteria(&self, ranking_id: &str, name: &str) -> Result<Criteria>;
    async fn get_criteria(&self, id: &str) -> Result<Option<Criteria>>;
    async fn list_criteria(&self, ranking_id: &str) -> Result<Vec<Criteria>>;

    // Items

    async fn create_item(&self, ranking_id: &str, creator_id: &str, data: &NewItem)
        -> Result<Item>;
    async fn get_item(&self, id: &str) -> Result<Option<Item>>;
    async fn list_items(&self, ranking_id: &str) -> Result<Vec<Item>>;
    /// Removes the item with its scores and photo references
    async fn delete_item(&self, id: &str) -> Result<bool>;

    // Scores

    /// Atomic create-or-update keyed on (item, user, criteria)
    async fn upsert_score(
        &self,
        item_id: &str,
        user_id: &str,
        criteria_id: &str,
        score: f64,
    ) -> Result<(Score, UpsertOutcome)>;
    /// Ordered by criteria name, then insertion order
    async fn list_scores(&self, item_id: &str) -> Result<Vec<ScoreDetail>>;
    /// `None` when the item has no scores
    async fn average_score(&self, item_id: &str) -> Result<Option<f64>>;

    // Reports

    async fn create_report(&self, data: &NewReport) -> Result<AbuseReport>;
}
