//! Project slug validation and generation.

use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;

pub const SLUG_MIN_LEN: usize = 3;
pub const SLUG_MAX_LEN: usize = 63;
/// Base used when a name cannot produce a valid slug on its own.
pub const FALLBACK_SLUG_BASE: &str = "preswald";

lazy_static! {
    static ref SLUG_SHAPE: Regex = Regex::new(r"^[a-z0-9][a-z0-9-]*[a-z0-9]$").expect("slug pattern is valid");
    static ref NON_ALNUM_RUNS: Regex = Regex::new(r"[^a-zA-Z0-9]+").expect("separator pattern is valid");
}

/// Check that `slug` is lowercase kebab-style and between 3 and 63 characters.
pub fn validate_slug(slug: &str) -> bool {
    SLUG_SHAPE.is_match(slug) && (SLUG_MIN_LEN..=SLUG_MAX_LEN).contains(&slug.len())
}

/// Derive a slug from a free-text project name plus a random six-digit suffix.
///
/// Falls back to `preswald-<number>` when the name does not produce a
/// valid slug (empty after cleanup, or too long).
pub fn generate_slug(base_name: &str) -> String {
    let number = rand::rng().random_range(100_000..=999_999);
    slug_with_suffix(base_name, number)
}

/// Deterministic half of [`generate_slug`]: build `<base>-<number>` and
/// reuse the same number for the fallback.
pub fn slug_with_suffix(base_name: &str, number: u32) -> String {
    let lowered = base_name.to_lowercase();
    let base = NON_ALNUM_RUNS.replace_all(&lowered, "-");
    let slug = format!("{}-{number}", base.trim_matches('-'));

    if validate_slug(&slug) {
        slug
    } else {
        format!("{FALLBACK_SLUG_BASE}-{number}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_slug_length_bounds() {
        assert!(!validate_slug("ab"));
        assert!(validate_slug("abc"));
        assert!(validate_slug(&"a".repeat(63)));
        assert!(!validate_slug(&"a".repeat(64)));
    }

    #[test]
    fn validate_slug_shape() {
        assert!(validate_slug("valid-slug-1"));
        assert!(!validate_slug("-leading"));
        assert!(!validate_slug("trailing-"));
        assert!(!validate_slug("Upper-case"));
        assert!(!validate_slug("under_score"));
        assert!(!validate_slug(""));
    }

    #[test]
    fn slug_with_suffix_cleans_name() {
        assert_eq!(slug_with_suffix("My Project!!", 123_456), "my-project-123456");
        assert_eq!(slug_with_suffix("  --Data__Viz 2--  ", 654_321), "data-viz-2-654321");
    }

    #[test]
    fn slug_with_suffix_falls_back_with_same_number() {
        assert_eq!(slug_with_suffix("", 424_242), "preswald-424242");
        assert_eq!(slug_with_suffix("!!!", 100_000), "preswald-100000");
        assert_eq!(slug_with_suffix(&"x".repeat(60), 999_999), "preswald-999999");
    }

    #[test]
    fn slug_with_suffix_replaces_non_ascii_letters() {
        assert_eq!(slug_with_suffix("Café Olé", 111_111), "caf-ol-111111");
    }

    #[test]
    fn generate_slug_is_valid_and_prefixed() {
        for _ in 0..50 {
            let slug = generate_slug("My Project!!");
            assert!(validate_slug(&slug), "invalid slug {slug}");
            let suffix = slug.strip_prefix("my-project-").expect("prefix kept");
            let number: u32 = suffix.parse().expect("numeric suffix");
            assert!((100_000..=999_999).contains(&number));
        }
    }
}
