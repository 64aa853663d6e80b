//! Review model, DTOs and list ordering.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::display;
use yamdb_core::error::CoreError;
use yamdb_core::review::{validate_score, validate_text};
use yamdb_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `reviews` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    pub text: String,
    pub pub_date: Timestamp,
    pub author_id: DbId,
    /// `None` once the reviewed title has been deleted.
    pub title_id: Option<DbId>,
    pub score: i32,
    pub updated_at: Timestamp,
}

impl Review {
    /// Review text cut to a preview length.
    pub fn preview(&self) -> &str {
        display::preview(&self.text)
    }
}

impl fmt::Display for Review {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.text, self.score)
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating a review. `pub_date` is assigned by the database.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub author_id: DbId,
    pub title_id: DbId,
    pub text: String,
    pub score: i32,
}

impl CreateReview {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_text("Review text", &self.text)?;
        validate_score(self.score)
    }
}

/// DTO for editing a review. Author and title are fixed after creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReview {
    pub text: Option<String>,
    pub score: Option<i32>,
}

impl UpdateReview {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(text) = &self.text {
            validate_text("Review text", text)?;
        }
        if let Some(score) = self.score {
            validate_score(score)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Ordering and list parameters
// ---------------------------------------------------------------------------

/// Sort key for review listings.
///
/// Every variant breaks ties on `id` so paging is stable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSort {
    /// Oldest first.
    #[default]
    PubDate,
    /// Newest first.
    PubDateDesc,
    /// Highest score first, oldest first among equal scores.
    ScoreDesc,
}

impl ReviewSort {
    /// `ORDER BY` clause body for this sort key.
    pub fn order_by(self) -> &'static str {
        match self {
            ReviewSort::PubDate => "pub_date ASC, id ASC",
            ReviewSort::PubDateDesc => "pub_date DESC, id DESC",
            ReviewSort::ScoreDesc => "score DESC, pub_date ASC, id ASC",
        }
    }
}

/// Query parameters for review listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewListParams {
    #[serde(default)]
    pub sort: ReviewSort,
    /// Maximum results. Defaults to 100.
    pub limit: Option<i64>,
    /// Offset for pagination.
    pub offset: Option<i64>,
}
