//! Repository for the `users` table.

use sqlx::PgPool;
use yamdb_core::types::DbId;

use crate::error::DbError;
use crate::models::user::{CreateUser, User};
use crate::on_delete;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, created_at, updated_at";

/// Provides the user operations the catalog needs.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, DbError> {
        let query = format!(
            "INSERT INTO users (username, email)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .fetch_one(pool)
            .await?;
        Ok(user)
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Delete a user together with everything they wrote.
    ///
    /// Removes the user's comments, the user's reviews (and every comment on
    /// those reviews, whoever wrote it), then the user row.
    /// Returns `true` if a user was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;

        if !on_delete::lock_row(&mut tx, "users", id).await? {
            return Ok(false);
        }

        let review_ids = on_delete::lock_reviews_by_author(&mut tx, id).await?;
        let comments = on_delete::cascade_comments_for_author(&mut tx, id, &review_ids).await?;
        let reviews = on_delete::cascade_reviews_for_author(&mut tx, id).await?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(user_id = id, reviews, comments, "Deleted user and authored content");
        Ok(true)
    }
}
