//! Comment model and DTOs.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::display;
use yamdb_core::error::CoreError;
use yamdb_core::review::validate_text;
use yamdb_core::types::{DbId, Timestamp};

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub text: String,
    pub created: Timestamp,
    pub author_id: DbId,
    pub review_id: DbId,
    pub updated_at: Timestamp,
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(display::preview(&self.text))
    }
}

/// DTO for creating a comment. `created` is assigned by the database.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub author_id: DbId,
    pub review_id: DbId,
    pub text: String,
}

impl CreateComment {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_text("Comment text", &self.text)
    }
}

/// DTO for editing a comment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateComment {
    pub text: Option<String>,
}

impl UpdateComment {
    pub fn validate(&self) -> Result<(), CoreError> {
        match &self.text {
            Some(text) => validate_text("Comment text", text),
            None => Ok(()),
        }
    }
}
