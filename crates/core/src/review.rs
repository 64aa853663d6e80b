//! Review score bounds and text rules.

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Lowest accepted review score (inclusive).
pub const MIN_SCORE: i32 = 1;

/// Highest accepted review score (inclusive).
pub const MAX_SCORE: i32 = 10;

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Validate that a score lies in `MIN_SCORE..=MAX_SCORE`.
///
/// Out-of-range values are rejected, never clamped.
pub fn validate_score(score: i32) -> Result<(), CoreError> {
    if (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Score {score} is out of range. Must be between {MIN_SCORE} and {MAX_SCORE}"
        )))
    }
}

/// Validate review or comment body text: must contain something besides whitespace.
pub fn validate_text(field: &str, text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
