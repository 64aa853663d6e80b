//! Catalog field rules for categories, genres, and titles.
//!
//! Names and slugs share the same length ceiling. Slugs are additionally
//! restricted to ASCII letters, digits, hyphens and underscores so they can
//! appear in URLs unescaped.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length for a category, genre or title name in characters.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length for a category or genre slug in characters.
pub const MAX_SLUG_LENGTH: usize = 100;

/// Regex pattern a slug must match in full.
pub const SLUG_PATTERN: &str = r"^[-a-zA-Z0-9_]+$";

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SLUG_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a display name: non-blank and within [`MAX_NAME_LENGTH`].
///
/// `field` is used in the error message only (e.g. `"Category name"`).
pub fn validate_name(field: &str, name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    let len = name.chars().count();
    if len > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {MAX_NAME_LENGTH} characters (got {len})"
        )));
    }
    Ok(())
}

/// Validate a slug against [`SLUG_PATTERN`] and [`MAX_SLUG_LENGTH`].
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.len() > MAX_SLUG_LENGTH {
        return Err(CoreError::Validation(format!(
            "Slug exceeds maximum length of {MAX_SLUG_LENGTH} characters (got {})",
            slug.len()
        )));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(CoreError::Validation(format!(
            "Invalid slug '{slug}'. Only letters, digits, '-' and '_' are allowed"
        )));
    }
    Ok(())
}
