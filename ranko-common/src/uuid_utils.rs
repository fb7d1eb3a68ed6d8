//! Identifier utilities
//!
//! Entities are keyed by opaque strings; new rows get UUIDv4 text.

use uuid::Uuid;

/// Generate a new entity id
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// True when `s` looks like an id this crate would have generated
pub fn is_well_formed(s: &str) -> bool {
    Uuid::parse_str(s).is_ok()
}
