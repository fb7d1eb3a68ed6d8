//! # Ranko Common Library
//!
//! Shared code for the Ranko ranking engine and its binaries:
//! - Database models and the `Store` persistence trait
//! - SQLite store implementation and schema initialization
//! - Configuration loading
//! - Identifier and timestamp helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use db::{SqliteStore, Store};
pub use error::{Error, Result};
