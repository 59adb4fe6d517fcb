use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ApiError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Checks the fields shared by registration and update. Expects a trimmed
/// username and a normalized email.
pub(crate) fn validate_identity(
    username: &str,
    email: &str,
    profile: Option<&serde_json::Value>,
) -> Result<(), ApiError> {
    if username.is_empty() {
        return Err(ApiError::bad_request("username is required"));
    }
    if !is_valid_email(email) {
        return Err(ApiError::bad_request("invalid email"));
    }
    if matches!(profile, Some(p) if !p.is_object()) {
        return Err(ApiError::bad_request("profile must be a JSON object"));
    }
    Ok(())
}
