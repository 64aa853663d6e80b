//! Repository for the `comments` table.

use sqlx::PgPool;
use yamdb_core::types::DbId;

use crate::error::DbError;
use crate::models::comment::{Comment, CreateComment, UpdateComment};
use crate::repositories::page;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, text, created, author_id, review_id, updated_at";

/// Provides CRUD operations for comments on reviews.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert a new comment, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateComment) -> Result<Comment, DbError> {
        input.validate()?;
        let query = format!(
            "INSERT INTO comments (author_id, review_id, text)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(input.author_id)
            .bind(input.review_id)
            .bind(&input.text)
            .fetch_one(pool)
            .await?;
        Ok(comment)
    }

    /// Find a comment by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Comment>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = $1");
        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(comment)
    }

    /// List the comments on a review in the order they were written.
    pub async fn list_for_review(
        pool: &PgPool,
        review_id: DbId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Comment>, DbError> {
        let (limit, offset) = page(limit, offset);
        let query = format!(
            "SELECT {COLUMNS} FROM comments \
             WHERE review_id = $1 \
             ORDER BY created, id \
             LIMIT $2 OFFSET $3"
        );
        let comments = sqlx::query_as::<_, Comment>(&query)
            .bind(review_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
        Ok(comments)
    }

    /// List the comments written by an author, newest first.
    pub async fn list_by_author(pool: &PgPool, author_id: DbId) -> Result<Vec<Comment>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments WHERE author_id = $1 ORDER BY created DESC, id DESC"
        );
        let comments = sqlx::query_as::<_, Comment>(&query)
            .bind(author_id)
            .fetch_all(pool)
            .await?;
        Ok(comments)
    }

    /// Edit a comment's text.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateComment,
    ) -> Result<Option<Comment>, DbError> {
        input.validate()?;
        let query = format!(
            "UPDATE comments SET text = COALESCE($2, text) WHERE id = $1 RETURNING {COLUMNS}"
        );
        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(&input.text)
            .fetch_optional(pool)
            .await?;
        Ok(comment)
    }

    /// Delete a comment. Nothing references comments, so no handlers run.
    ///
    /// Returns `true` if a comment was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
