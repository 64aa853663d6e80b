//! Title (reviewable work) and title-genre junction models.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::catalog::validate_name;
use yamdb_core::display;
use yamdb_core::error::CoreError;
use yamdb_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `titles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Title {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    /// `None` when uncategorised or after the category was deleted.
    pub category_id: Option<DbId>,
    /// Cached aggregate maintained outside this crate. `None` until set.
    pub rating: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(display::label(&self.name))
    }
}

/// A row from the `title_genres` junction table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TitleGenre {
    pub id: DbId,
    pub title_id: DbId,
    pub genre_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A junction row joined with the names on both sides.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TitleGenreLink {
    pub id: DbId,
    pub title_id: DbId,
    pub title_name: String,
    pub genre_id: DbId,
    pub genre_name: String,
}

impl fmt::Display for TitleGenreLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            display::label(&self.title_name),
            display::label(&self.genre_name)
        )
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating a new title.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTitle {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    /// Genres linked in the same transaction as the insert.
    #[serde(default)]
    pub genre_ids: Vec<DbId>,
}

impl CreateTitle {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name("Title name", &self.name)
    }
}

/// DTO for updating a title. Genres are managed through the repository's
/// genre operations, and `rating` through `TitleRepo::set_rating`.
///
/// The nullable columns use `Option<Option<_>>`: `None` keeps the stored
/// value, `Some(None)` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTitle {
    pub name: Option<String>,
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "crate::models::deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::deserialize_some")]
    pub category_id: Option<Option<DbId>>,
}

impl UpdateTitle {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            validate_name("Title name", name)?;
        }
        Ok(())
    }
}

/// Query parameters for title listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleListParams {
    pub category_id: Option<DbId>,
    pub genre_id: Option<DbId>,
    pub year: Option<i32>,
    /// Maximum results. Defaults to 100.
    pub limit: Option<i64>,
    /// Offset for pagination.
    pub offset: Option<i64>,
}
