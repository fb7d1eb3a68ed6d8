//! # Ranko Core
//!
//! The ranking collaboration and scoring engine:
//! - Validation gate (existence and membership checks)
//! - Invite lifecycle (create, accept, decline, cancel)
//! - Score ledger (per-user, per-criteria upserts and averages)
//! - Item registry and abuse report intake
//! - Best-effort push notification fan-out
//!
//! Storage goes through `ranko_common::Store`; push delivery through
//! `notify::PushSender`.

pub mod accounts;
pub mod engine;
pub mod error;
pub mod gate;
pub mod invites;
pub mod items;
pub mod locale;
pub mod notify;
pub mod rankings;
pub mod reports;
pub mod scores;
pub mod validation;

pub use engine::{Engine, EngineConfig};
pub use error::{DomainError, DomainResult, Entity};
