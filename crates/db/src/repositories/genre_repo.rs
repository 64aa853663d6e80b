//! Repository for the `genres` table.

use sqlx::PgPool;
use yamdb_core::types::DbId;

use crate::error::DbError;
use crate::models::genre::{Genre, CreateGenre, UpdateGenre};
use crate::on_delete;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, created_at, updated_at";

/// Provides CRUD operations for genres.
pub struct GenreRepo;

impl GenreRepo {
    /// Insert a new genre, returning the created row.
    ///
    /// A slug already in use fails with [`DbError::UniqueViolation`].
    pub async fn create(pool: &PgPool, input: &CreateGenre) -> Result<Genre, DbError> {
        input.validate()?;
        let query = format!(
            "INSERT INTO genres (name, slug) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let genre = sqlx::query_as::<_, Genre>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .fetch_one(pool)
            .await?;
        Ok(genre)
    }

    /// Find a genre by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Genre>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM genres WHERE id = $1");
        let genre = sqlx::query_as::<_, Genre>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(genre)
    }

    /// Find a genre by its slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Genre>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM genres WHERE slug = $1");
        let genre = sqlx::query_as::<_, Genre>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await?;
        Ok(genre)
    }

    /// List all genres alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<Genre>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM genres ORDER BY name, id");
        let genres = sqlx::query_as::<_, Genre>(&query)
            .fetch_all(pool)
            .await?;
        Ok(genres)
    }

    /// Update a genre. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateGenre,
    ) -> Result<Option<Genre>, DbError> {
        input.validate()?;
        let query = format!(
            "UPDATE genres SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let genre = sqlx::query_as::<_, Genre>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .fetch_optional(pool)
            .await?;
        Ok(genre)
    }

    /// Delete a genre and its title links. The titles themselves are kept.
    ///
    /// Returns `true` if a genre was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;

        if !on_delete::lock_row(&mut tx, "genres", id).await? {
            return Ok(false);
        }

        let links = on_delete::cascade_title_genres_for_genre(&mut tx, id).await?;

        sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(genre_id = id, links, "Deleted genre");
        Ok(true)
    }
}
