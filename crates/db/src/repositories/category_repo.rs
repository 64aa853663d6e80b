//! Repository for the `categories` table.

use sqlx::PgPool;
use yamdb_core::types::DbId;

use crate::error::DbError;
use crate::models::category::{Category, CreateCategory, UpdateCategory};
use crate::on_delete;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, created_at, updated_at";

/// Provides CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a new category, returning the created row.
    ///
    /// A slug already in use fails with [`DbError::UniqueViolation`].
    pub async fn create(pool: &PgPool, input: &CreateCategory) -> Result<Category, DbError> {
        input.validate()?;
        let query = format!(
            "INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let category = sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .fetch_one(pool)
            .await?;
        Ok(category)
    }

    /// Find a category by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        let category = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(category)
    }

    /// Find a category by its slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Category>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE slug = $1");
        let category = sqlx::query_as::<_, Category>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await?;
        Ok(category)
    }

    /// List all categories ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Category>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM categories ORDER BY name, id");
        let categories = sqlx::query_as::<_, Category>(&query)
            .fetch_all(pool)
            .await?;
        Ok(categories)
    }

    /// Update a category. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<Category>, DbError> {
        input.validate()?;
        let query = format!(
            "UPDATE categories SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let category = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .fetch_optional(pool)
            .await?;
        Ok(category)
    }

    /// Delete a category. Titles in it are kept with their category cleared.
    ///
    /// Returns `true` if a category was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;

        if !on_delete::lock_row(&mut tx, "categories", id).await? {
            return Ok(false);
        }

        let titles = on_delete::nullify_title_category(&mut tx, id).await?;

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(category_id = id, titles, "Deleted category");
        Ok(true)
    }
}
