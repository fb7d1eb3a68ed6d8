//! SQLite-backed `Store`

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use super::init::{init_database, init_memory_database};
use super::models::*;
use super::store::Store;
use crate::time::now;
use crate::uuid_utils::new_id;
use crate::{Error, Result};

const USER_COLUMNS: &str = "id, email, name, push_destination, created_at";
const RANKING_COLUMNS: &str =
    "id, name, description, owner_id, banner, geolocation_enabled, created_at, updated_at, deleted_at";
const INVITE_COLUMNS: &str = "id, ranking_id, email, inviter_id, created_at, updated_at";
const ITEM_COLUMNS: &str =
    "id, ranking_id, creator_id, name, description, link, latitude, longitude, created_at, updated_at";

/// Store backed by a SQLite connection pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap an already initialized pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database file and its schema
    pub async fn open(db_path: &Path) -> Result<Self> {
        Ok(Self::new(init_database(db_path).await?))
    }

    /// Fresh private in-memory database
    pub async fn in_memory() -> Result<Self> {
        Ok(Self::new(init_memory_database().await?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn load_photos(&self, item_id: &str) -> Result<Vec<String>> {
        let photos = sqlx::query_scalar::<_, String>(
            "SELECT photo_ref FROM ranking_item_photos WHERE item_id = ? ORDER BY position",
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        push_destination: Option<&str>,
    ) -> Result<User> {
        let user = User {
            id: new_id(),
            email: email.to_string(),
            name: name.to_string(),
            push_destination: push_destination.map(str::to_string),
            created_at: now(),
        };

        sqlx::query(
            "INSERT INTO users (id, email, name, push_destination, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.push_destination)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::from_unique(e, "user email already registered"))?;

        Ok(user)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn set_push_destination(&self, user_id: &str, destination: Option<&str>) -> Result<()> {
        let result = sqlx::query("UPDATE users SET push_destination = ? WHERE id = ?")
            .bind(destination)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("user {user_id}")));
        }
        Ok(())
    }

    async fn create_ranking(&self, owner_id: &str, data: &NewRanking) -> Result<Ranking> {
        let timestamp = now();
        let ranking = Ranking {
            id: new_id(),
            name: data.name.clone(),
            description: data.description.clone(),
            owner_id: owner_id.to_string(),
            banner: data.banner.clone(),
            geolocation_enabled: data.geolocation_enabled,
            created_at: timestamp,
            updated_at: timestamp,
            deleted_at: None,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO rankings (
                id, name, description, owner_id, banner, geolocation_enabled,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&ranking.id)
        .bind(&ranking.name)
        .bind(&ranking.description)
        .bind(&ranking.owner_id)
        .bind(&ranking.banner)
        .bind(ranking.geolocation_enabled)
        .bind(ranking.created_at)
        .bind(ranking.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO ranking_memberships (id, user_id, ranking_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(new_id())
        .bind(owner_id)
        .bind(&ranking.id)
        .bind(timestamp)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!("Created ranking {} owned by {}", ranking.id, owner_id);
        Ok(ranking)
    }

    async fn get_ranking(&self, id: &str) -> Result<Option<Ranking>> {
        let ranking = sqlx::query_as::<_, Ranking>(&format!(
            "SELECT {RANKING_COLUMNS} FROM rankings WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ranking)
    }

    async fn update_ranking(&self, id: &str, patch: &RankingPatch) -> Result<Ranking> {
        let result = sqlx::query(
            r#"
            UPDATE rankings SET
                name = COALESCE(?, name),
                description = COALESCE(?, description),
                banner = COALESCE(?, banner),
                geolocation_enabled = COALESCE(?, geolocation_enabled),
                updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&patch.name)
        .bind(&patch.description)
        .bind(&patch.banner)
        .bind(patch.geolocation_enabled)
        .bind(now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("ranking {id}")));
        }

        self.get_ranking(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("ranking {id}")))
    }

    async fn soft_delete_ranking(&self, id: &str) -> Result<()> {
        let timestamp = now();
        sqlx::query(
            "UPDATE rankings SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(timestamp)
        .bind(timestamp)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_rankings_for_user(&self, user_id: &str) -> Result<Vec<Ranking>> {
        let rankings = sqlx::query_as::<_, Ranking>(
            r#"
            SELECT r.id, r.name, r.description, r.owner_id, r.banner, r.geolocation_enabled,
                   r.created_at, r.updated_at, r.deleted_at
            FROM rankings r
            JOIN ranking_memberships m ON m.ranking_id = r.id
            WHERE m.user_id = ? AND r.deleted_at IS NULL
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rankings)
    }

    async fn get_membership(&self, ranking_id: &str, user_id: &str) -> Result<Option<Membership>> {
        let membership = sqlx::query_as::<_, Membership>(
            "SELECT id, user_id, ranking_id, created_at FROM ranking_memberships WHERE ranking_id = ? AND user_id = ?",
        )
        .bind(ranking_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership)
    }

    async fn add_membership(&self, user_id: &str, ranking_id: &str) -> Result<Membership> {
        let membership = Membership {
            id: new_id(),
            user_id: user_id.to_string(),
            ranking_id: ranking_id.to_string(),
            created_at: now(),
        };

        sqlx::query(
            "INSERT INTO ranking_memberships (id, user_id, ranking_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&membership.id)
        .bind(&membership.user_id)
        .bind(&membership.ranking_id)
        .bind(membership.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::from_unique(e, "user is already a member"))?;

        Ok(membership)
    }

    async fn list_members(&self, ranking_id: &str) -> Result<Vec<User>> {
        let members = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.name, u.push_destination, u.created_at
            FROM users u
            JOIN ranking_memberships m ON m.user_id = u.id
            WHERE m.ranking_id = ?
            ORDER BY m.created_at
            "#,
        )
        .bind(ranking_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    async fn create_invite(
        &self,
        ranking_id: &str,
        email: &str,
        inviter_id: &str,
    ) -> Result<Invite> {
        let timestamp = now();
        let invite = Invite {
            id: new_id(),
            ranking_id: ranking_id.to_string(),
            email: email.to_string(),
            inviter_id: inviter_id.to_string(),
            created_at: timestamp,
            updated_at: timestamp,
        };

        sqlx::query(&format!(
            "INSERT INTO ranking_invites ({INVITE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)"
        ))
        .bind(&invite.id)
        .bind(&invite.ranking_id)
        .bind(&invite.email)
        .bind(&invite.inviter_id)
        .bind(invite.created_at)
        .bind(invite.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::from_unique(e, "invite already pending"))?;

        Ok(invite)
    }

    async fn get_invite(&self, id: &str) -> Result<Option<Invite>> {
        let invite = sqlx::query_as::<_, Invite>(&format!(
            "SELECT {INVITE_COLUMNS} FROM ranking_invites WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invite)
    }

    async fn pending_invite(&self, ranking_id: &str, email: &str) -> Result<Option<Invite>> {
        let invite = sqlx::query_as::<_, Invite>(&format!(
            "SELECT {INVITE_COLUMNS} FROM ranking_invites WHERE ranking_id = ? AND email = ?"
        ))
        .bind(ranking_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invite)
    }

    async fn list_invites_by_email(&self, email: &str) -> Result<Vec<Invite>> {
        let invites = sqlx::query_as::<_, Invite>(&format!(
            "SELECT {INVITE_COLUMNS} FROM ranking_invites WHERE email = ? ORDER BY created_at"
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        Ok(invites)
    }

    async fn list_invites_by_ranking(&self, ranking_id: &str) -> Result<Vec<Invite>> {
        let invites = sqlx::query_as::<_, Invite>(&format!(
            "SELECT {INVITE_COLUMNS} FROM ranking_invites WHERE ranking_id = ? ORDER BY created_at"
        ))
        .bind(ranking_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(invites)
    }

    async fn delete_invite(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ranking_invites WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn accept_invite(&self, invite: &Invite, user_id: &str) -> Result<Membership> {
        let mut tx = self.pool.begin().await?;

        // A membership left behind by an interrupted earlier attempt is kept as is
        sqlx::query(
            r#"
            INSERT INTO ranking_memberships (id, user_id, ranking_id, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id, ranking_id) DO NOTHING
            "#,
        )
        .bind(new_id())
        .bind(user_id)
        .bind(&invite.ranking_id)
        .bind(now())
        .execute(&mut *tx)
        .await?;

        let membership = sqlx::query_as::<_, Membership>(
            "SELECT id, user_id, ranking_id, created_at FROM ranking_memberships WHERE ranking_id = ? AND user_id = ?",
        )
        .bind(&invite.ranking_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM ranking_invites WHERE id = ?")
            .bind(&invite.id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            // Consumed concurrently; roll back so the caller sees a missing invite
            tx.rollback().await?;
            return Err(Error::NotFound(format!("invite {}", invite.id)));
        }

        tx.commit().await?;

        info!(
            "Invite {} accepted: user {} joined ranking {}",
            invite.id, user_id, invite.ranking_id
        );
        Ok(membership)
    }

    async fn create_criteria(&self, ranking_id: &str, name: &str) -> Result<Criteria> {
        let criteria = Criteria {
            id: new_id(),
            ranking_id: ranking_id.to_string(),
            name: name.to_string(),
            created_at: now(),
        };

        sqlx::query(
            "INSERT INTO ranking_criteria (id, ranking_id, name, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&criteria.id)
        .bind(&criteria.ranking_id)
        .bind(&criteria.name)
        .bind(criteria.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::from_unique(e, "criteria name already used in ranking"))?;

        Ok(criteria)
    }

    async fn get_criteria(&self, id: &str) -> Result<Option<Criteria>> {
        let criteria = sqlx::query_as::<_, Criteria>(
            "SELECT id, ranking_id, name, created_at FROM ranking_criteria WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(criteria)
    }

    async fn list_criteria(&self, ranking_id: &str) -> Result<Vec<Criteria>> {
        let criteria = sqlx::query_as::<_, Criteria>(
            "SELECT id, ranking_id, name, created_at FROM ranking_criteria WHERE ranking_id = ? ORDER BY name",
        )
        .bind(ranking_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(criteria)
    }

    async fn create_item(
        &self,
        ranking_id: &str,
        creator_id: &str,
        data: &NewItem,
    ) -> Result<Item> {
        let timestamp = now();
        let item = Item {
            id: new_id(),
            ranking_id: ranking_id.to_string(),
            creator_id: creator_id.to_string(),
            name: data.name.clone(),
            description: data.description.clone(),
            link: data.link.clone(),
            latitude: data.geolocation.map(|g| g.latitude),
            longitude: data.geolocation.map(|g| g.longitude),
            photos: data.photos.clone(),
            created_at: timestamp,
            updated_at: timestamp,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            "INSERT INTO ranking_items ({ITEM_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&item.id)
        .bind(&item.ranking_id)
        .bind(&item.creator_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.link)
        .bind(item.latitude)
        .bind(item.longitude)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await?;

        for (position, photo) in item.photos.iter().enumerate() {
            sqlx::query(
                "INSERT INTO ranking_item_photos (id, item_id, photo_ref, position) VALUES (?, ?, ?, ?)",
            )
            .bind(new_id())
            .bind(&item.id)
            .bind(photo)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(item)
    }

    async fn get_item(&self, id: &str) -> Result<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM ranking_items WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match item {
            Some(mut item) => {
                item.photos = self.load_photos(&item.id).await?;
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }

    async fn list_items(&self, ranking_id: &str) -> Result<Vec<Item>> {
        let mut items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM ranking_items WHERE ranking_id = ? ORDER BY created_at, rowid"
        ))
        .bind(ranking_id)
        .fetch_all(&self.pool)
        .await?;

        let rows = sqlx::query(
            r#"
            SELECT p.item_id, p.photo_ref
            FROM ranking_item_photos p
            JOIN ranking_items i ON i.id = p.item_id
            WHERE i.ranking_id = ?
            ORDER BY p.item_id, p.position
            "#,
        )
        .bind(ranking_id)
        .fetch_all(&self.pool)
        .await?;

        let mut photos: HashMap<String, Vec<String>> = HashMap::new();
        for row in rows {
            let item_id: String = row.get("item_id");
            photos.entry(item_id).or_default().push(row.get("photo_ref"));
        }
        for item in &mut items {
            item.photos = photos.remove(&item.id).unwrap_or_default();
        }

        Ok(items)
    }

    async fn delete_item(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ranking_items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn upsert_score(
        &self,
        item_id: &str,
        user_id: &str,
        criteria_id: &str,
        score: f64,
    ) -> Result<(Score, UpsertOutcome)> {
        let candidate_id = new_id();
        let timestamp = now();

        // The conflict target keeps the original row id, which tells the two paths apart
        let row = sqlx::query_as::<_, Score>(
            r#"
            INSERT INTO ranking_item_scores (
                id, item_id, criteria_id, user_id, score, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(item_id, user_id, criteria_id) DO UPDATE SET
                score = excluded.score,
                updated_at = excluded.updated_at
            RETURNING id, item_id, criteria_id, user_id, score, created_at, updated_at
            "#,
        )
        .bind(&candidate_id)
        .bind(item_id)
        .bind(criteria_id)
        .bind(user_id)
        .bind(score)
        .bind(timestamp)
        .bind(timestamp)
        .fetch_one(&self.pool)
        .await?;

        let outcome = if row.id == candidate_id {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        };

        debug!(
            "Score {:?} for item {} criteria {} by {}: {}",
            outcome, item_id, criteria_id, user_id, score
        );
        Ok((row, outcome))
    }

    async fn list_scores(&self, item_id: &str) -> Result<Vec<ScoreDetail>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.item_id, s.criteria_id, c.name AS criteria_name,
                   s.user_id, u.name AS user_name, s.score, s.created_at, s.updated_at
            FROM ranking_item_scores s
            JOIN ranking_criteria c ON c.id = s.criteria_id
            JOIN users u ON u.id = s.user_id
            WHERE s.item_id = ?
            ORDER BY c.name ASC, s.rowid ASC
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        let scores = rows
            .into_iter()
            .map(|row| ScoreDetail {
                id: row.get("id"),
                item_id: row.get("item_id"),
                criteria_id: row.get("criteria_id"),
                criteria_name: row.get("criteria_name"),
                user: PublicProfile {
                    id: row.get("user_id"),
                    name: row.get("user_name"),
                },
                score: row.get("score"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            })
            .collect();

        Ok(scores)
    }

    async fn average_score(&self, item_id: &str) -> Result<Option<f64>> {
        let average = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(score) FROM ranking_item_scores WHERE item_id = ?",
        )
        .bind(item_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(average)
    }

    async fn create_report(&self, data: &NewReport) -> Result<AbuseReport> {
        let report = AbuseReport {
            id: new_id(),
            target_type: data.target_type,
            ranking_id: data.ranking_id.clone(),
            item_id: data.item_id.clone(),
            reporter_id: data.reporter_id.clone(),
            description: data.description.clone(),
            created_at: now(),
        };

        sqlx::query(
            r#"
            INSERT INTO abuse_reports (
                id, target_type, ranking_id, item_id, reporter_id, description, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&report.id)
        .bind(report.target_type)
        .bind(&report.ranking_id)
        .bind(&report.item_id)
        .bind(&report.reporter_id)
        .bind(&report.description)
        .bind(report.created_at)
        .execute(&self.pool)
        .await?;

        info!(
            "Abuse report {} filed against {:?} in ranking {}",
            report.id, report.target_type, report.ranking_id
        );
        Ok(report)
    }
}
