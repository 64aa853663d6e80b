//! Category model and DTOs.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::catalog::{validate_name, validate_slug};
use yamdb_core::display;
use yamdb_core::error::CoreError;
use yamdb_core::types::{DbId, Timestamp};

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(display::label(&self.name))
    }
}

/// DTO for creating a new category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub slug: String,
}

impl CreateCategory {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name("Category name", &self.name)?;
        validate_slug(&self.slug)
    }
}

/// DTO for updating a category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub slug: Option<String>,
}

impl UpdateCategory {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            validate_name("Category name", name)?;
        }
        if let Some(slug) = &self.slug {
            validate_slug(slug)?;
        }
        Ok(())
    }
}
