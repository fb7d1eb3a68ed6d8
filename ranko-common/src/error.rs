//! Common error types for Ranko

use thiserror::Error;

/// Common result type for Ranko storage and configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Ranko crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A uniqueness constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Row expected by a write was not found
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Map a unique-constraint violation to `Conflict`, leaving other errors untouched
    pub fn from_unique(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::Conflict(what.to_string())
            }
            _ => Error::Database(err),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }
}
