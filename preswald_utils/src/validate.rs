//! Format validators for user-supplied credentials and identifiers.
//!
//! Validators never fail: malformed input is reported through a
//! [`ValidationResult`] so the caller decides how to present it.

use lazy_static::lazy_static;
use regex::Regex;

use crate::normalize::{GITHUB_USERNAME_MAX_LEN, normalize_github_username};

pub const API_KEY_FORMAT: &str = "prswld-xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx";
pub const API_KEY_EXAMPLE: &str = "prswld-ab11bc24-927c-4962-820a-417312f3c55c";

lazy_static! {
    static ref API_KEY: Regex =
        Regex::new(r"^prswld-[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$")
            .expect("api key pattern is valid");
    // alphanumeric groups joined by single hyphens; length is checked separately
    static ref GITHUB_USERNAME: Regex =
        Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("username pattern is valid");
}

/// Outcome of a validation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Human-readable explanation; empty when valid.
    pub message: String,
    /// Suggested replacement value, when one could be derived.
    pub corrected: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: String::new(),
            corrected: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
            corrected: None,
        }
    }

    /// Attach a corrected value to this result.
    #[must_use]
    pub fn with_correction(mut self, corrected: impl Into<String>) -> Self {
        self.corrected = Some(corrected.into());
        self
    }
}

/// Validate the format of a Structured Cloud API key.
///
/// Keys are `prswld-` followed by a UUID; hex digits may be either case.
pub fn validate_api_key(api_key: &str) -> ValidationResult {
    if api_key.is_empty() {
        return ValidationResult::invalid("❌ API key cannot be empty");
    }

    if !API_KEY.is_match(&api_key.to_lowercase()) {
        return ValidationResult::invalid(format!(
            "❌ Invalid API key format!\nRequired format: {API_KEY_FORMAT}\nExample: {API_KEY_EXAMPLE}"
        ));
    }

    ValidationResult::valid()
}

/// Validate a GitHub username, suggesting a normalized form when the raw
/// input contains characters GitHub would reject.
///
/// A valid result always carries the normalized name in `corrected`.
pub fn validate_github_username(username: &str) -> ValidationResult {
    let normalized = normalize_github_username(username);

    if normalized.is_empty() {
        return ValidationResult::invalid("Empty after normalization");
    }

    if !is_github_username_shape(&normalized) {
        return ValidationResult::invalid("Invalid format after normalization");
    }

    if normalized != username {
        return ValidationResult::invalid("Contains invalid characters").with_correction(normalized);
    }

    ValidationResult::valid().with_correction(normalized)
}

fn is_github_username_shape(candidate: &str) -> bool {
    candidate.len() <= GITHUB_USERNAME_MAX_LEN && GITHUB_USERNAME.is_match(candidate)
}
