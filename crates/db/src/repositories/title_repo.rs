//! Repository for the `titles` and `title_genres` tables.
//!
//! Provides title CRUD, genre associations, and the externally driven
//! `rating` write path.

use sqlx::PgPool;
use yamdb_core::error::CoreError;
use yamdb_core::types::DbId;

use crate::error::DbError;
use crate::models::genre::Genre;
use crate::models::title::{
    CreateTitle, Title, TitleGenre, TitleGenreLink, TitleListParams, UpdateTitle,
};
use crate::on_delete;
use crate::repositories::page;

/// Column list for the `titles` table.
const COLUMNS: &str =
    "id, name, year, description, category_id, rating, created_at, updated_at";

/// Column list for the `genres` table (used in JOIN queries).
const GENRE_COLUMNS: &str = "g.id, g.name, g.slug, g.created_at, g.updated_at";

/// Provides CRUD operations for titles and their genre associations.
pub struct TitleRepo;

impl TitleRepo {
    // -----------------------------------------------------------------------
    // Title CRUD
    // -----------------------------------------------------------------------

    /// Insert a new title.
    ///
    /// If `genre_ids` is non-empty, also creates junction rows in a transaction.
    pub async fn create(pool: &PgPool, input: &CreateTitle) -> Result<Title, DbError> {
        input.validate()?;
        let mut tx = pool.begin().await?;

        let insert_query = format!(
            "INSERT INTO titles (name, year, description, category_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let title = sqlx::query_as::<_, Title>(&insert_query)
            .bind(&input.name)
            .bind(input.year)
            .bind(&input.description)
            .bind(input.category_id)
            .fetch_one(&mut *tx)
            .await?;

        if !input.genre_ids.is_empty() {
            Self::set_genres_inner(&mut tx, title.id, &input.genre_ids).await?;
        }

        tx.commit().await?;
        Ok(title)
    }

    /// Find a title by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Title>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM titles WHERE id = $1");
        let title = sqlx::query_as::<_, Title>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(title)
    }

    /// List titles, optionally filtered by category, genre and year.
    ///
    /// Ordered by name, then id.
    pub async fn list(pool: &PgPool, params: &TitleListParams) -> Result<Vec<Title>, DbError> {
        let (limit, offset) = page(params.limit, params.offset);
        let query = format!(
            "SELECT {COLUMNS} FROM titles t \
             WHERE ($1::BIGINT IS NULL OR t.category_id = $1) \
               AND ($2::BIGINT IS NULL OR EXISTS ( \
                     SELECT 1 FROM title_genres tg \
                     WHERE tg.title_id = t.id AND tg.genre_id = $2)) \
               AND ($3::INTEGER IS NULL OR t.year = $3) \
             ORDER BY t.name, t.id \
             LIMIT $4 OFFSET $5"
        );
        let titles = sqlx::query_as::<_, Title>(&query)
            .bind(params.category_id)
            .bind(params.genre_id)
            .bind(params.year)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
        Ok(titles)
    }

    /// Update a title. Only non-`None` fields are applied.
    ///
    /// `description` and `category_id` are cleared by passing `Some(None)`.
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTitle,
    ) -> Result<Option<Title>, DbError> {
        input.validate()?;
        let description_provided = input.description.is_some();
        let description = input.description.as_ref().and_then(|d| d.as_deref());
        let category_provided = input.category_id.is_some();
        let category_id = input.category_id.flatten();

        let query = format!(
            "UPDATE titles SET \
                name = COALESCE($2, name), \
                year = COALESCE($3, year), \
                description = CASE WHEN $4 THEN $5::TEXT ELSE description END, \
                category_id = CASE WHEN $6 THEN $7::BIGINT ELSE category_id END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let title = sqlx::query_as::<_, Title>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.year)
            .bind(description_provided)
            .bind(description)
            .bind(category_provided)
            .bind(category_id)
            .fetch_optional(pool)
            .await?;
        Ok(title)
    }

    /// Overwrite the cached rating. `None` clears it.
    ///
    /// The value is computed elsewhere; this is only the write path.
    pub async fn set_rating(
        pool: &PgPool,
        id: DbId,
        rating: Option<i32>,
    ) -> Result<Option<Title>, DbError> {
        let query = format!("UPDATE titles SET rating = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let title = sqlx::query_as::<_, Title>(&query)
            .bind(id)
            .bind(rating)
            .fetch_optional(pool)
            .await?;
        Ok(title)
    }

    /// Delete a title.
    ///
    /// Genre links are deleted; reviews are kept with `title_id` cleared.
    /// Returns `true` if a title was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;

        if !on_delete::lock_row(&mut tx, "titles", id).await? {
            return Ok(false);
        }

        let links = on_delete::cascade_title_genres_for_title(&mut tx, id).await?;
        let reviews = on_delete::nullify_review_title(&mut tx, id).await?;

        sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(title_id = id, links, reviews, "Deleted title");
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Genre association helpers
    // -----------------------------------------------------------------------

    /// Get all genres linked to a title, alphabetically.
    pub async fn genres_for_title(pool: &PgPool, title_id: DbId) -> Result<Vec<Genre>, DbError> {
        let query = format!(
            "SELECT {GENRE_COLUMNS} \
             FROM genres g \
             JOIN title_genres tg ON tg.genre_id = g.id \
             WHERE tg.title_id = $1 \
             ORDER BY g.name, g.id"
        );
        let genres = sqlx::query_as::<_, Genre>(&query)
            .bind(title_id)
            .fetch_all(pool)
            .await?;
        Ok(genres)
    }

    /// Junction rows of a title joined with both names, for display.
    pub async fn genre_links(
        pool: &PgPool,
        title_id: DbId,
    ) -> Result<Vec<TitleGenreLink>, DbError> {
        let links = sqlx::query_as::<_, TitleGenreLink>(
            "SELECT tg.id, tg.title_id, t.name AS title_name, tg.genre_id, g.name AS genre_name \
             FROM title_genres tg \
             JOIN titles t ON t.id = tg.title_id \
             JOIN genres g ON g.id = tg.genre_id \
             WHERE tg.title_id = $1 \
             ORDER BY g.name, tg.id",
        )
        .bind(title_id)
        .fetch_all(pool)
        .await?;
        Ok(links)
    }

    /// Link a genre to a title (idempotent).
    ///
    /// Returns `true` if a new link was created, `false` if it already existed.
    pub async fn add_genre(
        pool: &PgPool,
        title_id: DbId,
        genre_id: DbId,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            "INSERT INTO title_genres (title_id, genre_id) \
             VALUES ($1, $2) \
             ON CONFLICT (title_id, genre_id) DO NOTHING",
        )
        .bind(title_id)
        .bind(genre_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Unlink a genre from a title.
    ///
    /// Returns `true` if the link was removed.
    pub async fn remove_genre(
        pool: &PgPool,
        title_id: DbId,
        genre_id: DbId,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            "DELETE FROM title_genres \
             WHERE title_id = $1 AND genre_id = $2",
        )
        .bind(title_id)
        .bind(genre_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace all genre links of a title.
    ///
    /// Fails with [`CoreError::NotFound`] if the title does not exist.
    pub async fn set_genres(
        pool: &PgPool,
        title_id: DbId,
        genre_ids: &[DbId],
    ) -> Result<Vec<TitleGenre>, DbError> {
        let mut tx = pool.begin().await?;

        if !on_delete::lock_row(&mut tx, "titles", title_id).await? {
            return Err(CoreError::NotFound {
                entity: "Title",
                id: title_id,
            }
            .into());
        }

        let links = Self::set_genres_inner(&mut tx, title_id, genre_ids).await?;
        tx.commit().await?;
        Ok(links)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Replace genre links within an existing transaction.
    ///
    /// Repeated ids in `genre_ids` produce a single link.
    async fn set_genres_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        title_id: DbId,
        genre_ids: &[DbId],
    ) -> Result<Vec<TitleGenre>, sqlx::Error> {
        sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
            .bind(title_id)
            .execute(&mut **tx)
            .await?;

        let mut links = Vec::with_capacity(genre_ids.len());
        for &genre_id in genre_ids {
            let link = sqlx::query_as::<_, TitleGenre>(
                "INSERT INTO title_genres (title_id, genre_id) VALUES ($1, $2) \
                 ON CONFLICT (title_id, genre_id) DO NOTHING \
                 RETURNING id, title_id, genre_id, created_at, updated_at",
            )
            .bind(title_id)
            .bind(genre_id)
            .fetch_optional(&mut **tx)
            .await?;
            links.extend(link);
        }

        Ok(links)
    }
}
