//! Database models, the persistence trait, and its SQLite implementation

pub mod init;
pub mod models;
pub mod sqlite;
pub mod store;

pub use init::*;
pub use models::*;
pub use sqlite::SqliteStore;
pub use store::Store;
