//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    /// Device token for push delivery
    pub push_destination: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// The part of a user other members may see
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ranking {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner_id: String,
    pub banner: Option<String>,
    pub geolocation_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Ranking {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRanking {
    pub name: String,
    pub description: String,
    pub banner: Option<String>,
    pub geolocation_enabled: bool,
}

/// Fields left as `None` are not changed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankingPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub banner: Option<String>,
    pub geolocation_enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Membership {
    pub id: String,
    pub user_id: String,
    pub ranking_id: String,
    pub created_at: DateTime<Utc>,
}

/// A pending invitation. The row only exists while the invite is pending.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invite {
    pub id: String,
    pub ranking_id: String,
    pub email: String,
    pub inviter_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Criteria {
    pub id: String,
    pub ranking_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geolocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: String,
    pub ranking_id: String,
    pub creator_id: String,
    pub name: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Photo references in upload order; loaded separately
    #[sqlx(skip)]
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn geolocation(&self) -> Option<Geolocation> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Geolocation {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub geolocation: Option<Geolocation>,
    pub photos: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Score {
    pub id: String,
    pub item_id: String,
    pub criteria_id: String,
    pub user_id: String,
    pub score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Whether an upsert inserted a new row or rewrote an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// A score joined with its scorer's profile and criteria name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreDetail {
    pub id: String,
    pub item_id: String,
    pub criteria_id: String,
    pub criteria_name: String,
    pub user: PublicProfile,
    pub score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum ReportTarget {
    Ranking,
    Item,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AbuseReport {
    pub id: String,
    pub target_type: ReportTarget,
    pub ranking_id: String,
    pub item_id: Option<String>,
    pub reporter_id: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReport {
    pub target_type: ReportTarget,
    pub ranking_id: String,
    pub item_id: Option<String>,
    pub reporter_id: String,
    pub description: String,
}
