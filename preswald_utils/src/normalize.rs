//! Username normalization.
//!
//! Turns free-form user input into something GitHub would accept as a
//! username: lowercase ASCII alphanumerics and single hyphens, at most
//! [`GITHUB_USERNAME_MAX_LEN`] characters.

use lazy_static::lazy_static;
use regex::Regex;

/// Longest username GitHub allows.
pub const GITHUB_USERNAME_MAX_LEN: usize = 39;

lazy_static! {
    static ref SEPARATORS: Regex = Regex::new(r"[_@]+").expect("separator pattern is valid");
    static ref DISALLOWED: Regex = Regex::new(r"[^a-z0-9-]").expect("disallowed pattern is valid");
    static ref HYPHEN_RUNS: Regex = Regex::new(r"-+").expect("hyphen pattern is valid");
}

/// Normalize a username with the usual cleanup steps.
///
/// Underscores and `@` become hyphens, anything else outside `[a-z0-9-]`
/// is dropped, hyphen runs collapse, and the result is truncated before
/// stray edge hyphens are trimmed. Never fails; the result may be empty.
pub fn normalize_github_username(username: &str) -> String {
    let lowered = username.trim().to_lowercase();
    let separated = SEPARATORS.replace_all(&lowered, "-");
    let cleaned = DISALLOWED.replace_all(&separated, "");
    let collapsed = HYPHEN_RUNS.replace_all(&cleaned, "-");

    // only ASCII survives the cleanup, so byte and char lengths agree
    let truncated = &collapsed[..collapsed.len().min(GITHUB_USERNAME_MAX_LEN)];
    truncated.trim_matches('-').to_string()
}
