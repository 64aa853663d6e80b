//! Repository for the `reviews` table.

use sqlx::PgPool;
use yamdb_core::types::DbId;

use crate::error::DbError;
use crate::models::review::{CreateReview, Review, ReviewListParams, UpdateReview};
use crate::on_delete;
use crate::repositories::page;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, text, pub_date, author_id, title_id, score, updated_at";

/// Provides CRUD operations for reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a new review, returning the created row.
    ///
    /// The score is checked before the insert. A second review by the same
    /// author for the same title fails with [`DbError::UniqueViolation`]
    /// (`uq_reviews_author_title`) and leaves the first untouched.
    pub async fn create(pool: &PgPool, input: &CreateReview) -> Result<Review, DbError> {
        input.validate()?;
        let query = format!(
            "INSERT INTO reviews (author_id, title_id, text, score)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let review = sqlx::query_as::<_, Review>(&query)
            .bind(input.author_id)
            .bind(input.title_id)
            .bind(&input.text)
            .bind(input.score)
            .fetch_one(pool)
            .await?;
        Ok(review)
    }

    /// Find a review by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Review>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM reviews WHERE id = $1");
        let review = sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(review)
    }

    /// Find the review an author wrote for a title, if any.
    pub async fn find_for_author_and_title(
        pool: &PgPool,
        author_id: DbId,
        title_id: DbId,
    ) -> Result<Option<Review>, DbError> {
        let query =
            format!("SELECT {COLUMNS} FROM reviews WHERE author_id = $1 AND title_id = $2");
        let review = sqlx::query_as::<_, Review>(&query)
            .bind(author_id)
            .bind(title_id)
            .fetch_optional(pool)
            .await?;
        Ok(review)
    }

    /// List the reviews of a title.
    ///
    /// Oldest first unless `params.sort` says otherwise.
    pub async fn list_for_title(
        pool: &PgPool,
        title_id: DbId,
        params: &ReviewListParams,
    ) -> Result<Vec<Review>, DbError> {
        let (limit, offset) = page(params.limit, params.offset);
        let query = format!(
            "SELECT {COLUMNS} FROM reviews \
             WHERE title_id = $1 \
             ORDER BY {} \
             LIMIT $2 OFFSET $3",
            params.sort.order_by()
        );
        let reviews = sqlx::query_as::<_, Review>(&query)
            .bind(title_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
        Ok(reviews)
    }

    /// List the reviews written by an author, including detached ones.
    pub async fn list_by_author(
        pool: &PgPool,
        author_id: DbId,
        params: &ReviewListParams,
    ) -> Result<Vec<Review>, DbError> {
        let (limit, offset) = page(params.limit, params.offset);
        let query = format!(
            "SELECT {COLUMNS} FROM reviews \
             WHERE author_id = $1 \
             ORDER BY {} \
             LIMIT $2 OFFSET $3",
            params.sort.order_by()
        );
        let reviews = sqlx::query_as::<_, Review>(&query)
            .bind(author_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
        Ok(reviews)
    }

    /// Update a review's text and/or score.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateReview,
    ) -> Result<Option<Review>, DbError> {
        input.validate()?;
        let query = format!(
            "UPDATE reviews SET
                text = COALESCE($2, text),
                score = COALESCE($3, score)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let review = sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .bind(&input.text)
            .bind(input.score)
            .fetch_optional(pool)
            .await?;
        Ok(review)
    }

    /// Delete a review and its comments.
    ///
    /// Returns `true` if a review was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;

        if !on_delete::lock_row(&mut tx, "reviews", id).await? {
            return Ok(false);
        }

        let comments = on_delete::cascade_comments_for_reviews(&mut tx, &[id]).await?;

        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(review_id = id, comments, "Deleted review");
        Ok(true)
    }
}
