//! Database initialization
//!
//! Opens (or creates) the SQLite database and creates the schema. Table
//! creation is idempotent, so opening an existing database is safe.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Private in-memory database, used by tests and dry runs
///
/// Every pooled connection to `:memory:` would otherwise see its own empty
/// database, so the pool is pinned to one long-lived connection.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_users_table(pool).await?;
    create_rankings_table(pool).await?;
    create_memberships_table(pool).await?;
    create_invites_table(pool).await?;
    create_criteria_table(pool).await?;
    create_items_table(pool).await?;
    create_item_photos_table(pool).await?;
    create_scores_table(pool).await?;
    create_abuse_reports_table(pool).await?;
    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            push_destination TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_rankings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rankings (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            owner_id TEXT NOT NULL REFERENCES users(id),
            banner TEXT,
            geolocation_enabled INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_memberships_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ranking_memberships (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            ranking_id TEXT NOT NULL REFERENCES rankings(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            UNIQUE(user_id, ranking_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_memberships_ranking ON ranking_memberships(ranking_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_invites_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ranking_invites (
            id TEXT PRIMARY KEY,
            ranking_id TEXT NOT NULL REFERENCES rankings(id) ON DELETE CASCADE,
            email TEXT NOT NULL,
            inviter_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(ranking_id, email)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_invites_email ON ranking_invites(email)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_criteria_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ranking_criteria (
            id TEXT PRIMARY KEY,
            ranking_id TEXT NOT NULL REFERENCES rankings(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(ranking_id, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ranking_items (
            id TEXT PRIMARY KEY,
            ranking_id TEXT NOT NULL REFERENCES rankings(id) ON DELETE CASCADE,
            creator_id TEXT NOT NULL REFERENCES users(id),
            name TEXT NOT NULL,
            description TEXT,
            link TEXT,
            latitude REAL,
            longitude REAL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_ranking ON ranking_items(ranking_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_item_photos_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ranking_item_photos (
            id TEXT PRIMARY KEY,
            item_id TEXT NOT NULL REFERENCES ranking_items(id) ON DELETE CASCADE,
            photo_ref TEXT NOT NULL,
            position INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Scores carry the (item, user, criteria) uniqueness key the upsert relies on
async fn create_scores_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ranking_item_scores (
            id TEXT PRIMARY KEY,
            item_id TEXT NOT NULL REFERENCES ranking_items(id) ON DELETE CASCADE,
            criteria_id TEXT NOT NULL REFERENCES ranking_criteria(id) ON DELETE CASCADE,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            score REAL NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(item_id, user_id, criteria_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Reports reference rankings and items without foreign keys: they are never
/// rewritten, even after the item they point at is deleted.
async fn create_abuse_reports_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS abuse_reports (
            id TEXT PRIMARY KEY,
            target_type TEXT NOT NULL CHECK (target_type IN ('RANKING', 'ITEM')),
            ranking_id TEXT NOT NULL,
            item_id TEXT,
            reporter_id TEXT NOT NULL,
            description TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
