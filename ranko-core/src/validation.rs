//! Pure input checks run before any domain logic

use ranko_common::config::ScoreConfig;
use ranko_common::db::Geolocation;

use crate::error::{DomainError, DomainResult};

/// Trim and lower-case an email, rejecting anything that cannot be an address
pub fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| DomainError::validation("email must contain '@'"))?;

    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(DomainError::validation(format!("invalid email: {}", raw.trim())));
    }

    Ok(email)
}

/// Non-blank text, trimmed
pub fn require_text(field: &str, value: &str) -> DomainResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

/// Blank optional text collapses to `None`
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn check_score(score: f64, bounds: &ScoreConfig) -> DomainResult<f64> {
    if !score.is_finite() {
        return Err(DomainError::validation("score must be a finite number"));
    }
    if score < bounds.min || score > bounds.max {
        return Err(DomainError::validation(format!(
            "score {} is outside {}..={}",
            score, bounds.min, bounds.max
        )));
    }
    Ok(score)
}

pub fn check_link(link: &str) -> DomainResult<()> {
    if link.starts_with("http://") || link.starts_with("https://") {
        Ok(())
    } else {
        Err(DomainError::validation("link must be an http(s) URL"))
    }
}

pub fn check_geolocation(geo: &Geolocation) -> DomainResult<()> {
    if !(-90.0..=90.0).contains(&geo.latitude) || !(-180.0..=180.0).contains(&geo.longitude) {
        return Err(DomainError::validation("geolocation out of range"));
    }
    Ok(())
}
