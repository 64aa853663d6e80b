//! Referential-integrity handlers run before a parent row is deleted.
//!
//! Every foreign key in the schema is `ON DELETE RESTRICT`, so the database
//! refuses to delete a parent that still has dependents. Each function here
//! resolves exactly one relationship from [`POLICY`], either by clearing the
//! reference or by deleting the dependent rows. Repository `delete` methods
//! call the relevant handlers inside the same transaction as the final
//! `DELETE`.
//!
//! All handlers return the number of dependent rows touched.

use sqlx::{Postgres, Transaction};
use yamdb_core::types::DbId;

/// What happens to a dependent row when the row it references is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteAction {
    /// Delete the dependent row as well.
    Cascade,
    /// Keep the dependent row and clear the reference column.
    SetNull,
}

/// One foreign-key relationship and its deletion behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeyRule {
    pub child_table: &'static str,
    pub column: &'static str,
    pub parent_table: &'static str,
    pub action: DeleteAction,
}

/// The complete deletion policy of the schema.
pub const POLICY: &[ForeignKeyRule] = &[
    ForeignKeyRule {
        child_table: "titles",
        column: "category_id",
        parent_table: "categories",
        action: DeleteAction::SetNull,
    },
    ForeignKeyRule {
        child_table: "title_genres",
        column: "title_id",
        parent_table: "titles",
        action: DeleteAction::Cascade,
    },
    ForeignKeyRule {
        child_table: "title_genres",
        column: "genre_id",
        parent_table: "genres",
        action: DeleteAction::Cascade,
    },
    ForeignKeyRule {
        child_table: "reviews",
        column: "author_id",
        parent_table: "users",
        action: DeleteAction::Cascade,
    },
    ForeignKeyRule {
        child_table: "reviews",
        column: "title_id",
        parent_table: "titles",
        action: DeleteAction::SetNull,
    },
    ForeignKeyRule {
        child_table: "comments",
        column: "author_id",
        parent_table: "users",
        action: DeleteAction::Cascade,
    },
    ForeignKeyRule {
        child_table: "comments",
        column: "review_id",
        parent_table: "reviews",
        action: DeleteAction::Cascade,
    },
];

/// Rules whose parent is `parent_table`.
pub fn rules_for(parent_table: &str) -> impl Iterator<Item = &'static ForeignKeyRule> + '_ {
    POLICY.iter().filter(move |r| r.parent_table == parent_table)
}

// ---------------------------------------------------------------------------
// Title -> Category
// ---------------------------------------------------------------------------

/// Clear `titles.category_id` for every title in the category.
pub async fn nullify_title_category(
    tx: &mut Transaction<'_, Postgres>,
    category_id: DbId,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE titles SET category_id = NULL WHERE category_id = $1")
        .bind(category_id)
        .execute(&mut **tx)
        .await?;
    tracing::debug!(
        category_id,
        titles = result.rows_affected(),
        "Cleared category from titles"
    );
    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// TitleGenre -> Title / Genre
// ---------------------------------------------------------------------------

/// Delete the genre links of a title.
pub async fn cascade_title_genres_for_title(
    tx: &mut Transaction<'_, Postgres>,
    title_id: DbId,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
        .bind(title_id)
        .execute(&mut **tx)
        .await?;
    tracing::debug!(
        title_id,
        links = result.rows_affected(),
        "Deleted title genre links"
    );
    Ok(result.rows_affected())
}

/// Delete the title links of a genre.
pub async fn cascade_title_genres_for_genre(
    tx: &mut Transaction<'_, Postgres>,
    genre_id: DbId,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM title_genres WHERE genre_id = $1")
        .bind(genre_id)
        .execute(&mut **tx)
        .await?;
    tracing::debug!(
        genre_id,
        links = result.rows_affected(),
        "Deleted genre title links"
    );
    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// Review -> User / Title
// ---------------------------------------------------------------------------

/// Lock every review written by `author_id` and return their ids.
///
/// Rows are locked in id order. Run this before touching the author's
/// comments so reviews are always locked ahead of comments.
pub async fn lock_reviews_by_author(
    tx: &mut Transaction<'_, Postgres>,
    author_id: DbId,
) -> Result<Vec<DbId>, sqlx::Error> {
    sqlx::query_scalar::<_, DbId>(
        "SELECT id FROM reviews WHERE author_id = $1 ORDER BY id FOR UPDATE",
    )
    .bind(author_id)
    .fetch_all(&mut **tx)
    .await
}

/// Delete every review written by `author_id`.
///
/// Comments on those reviews must already be gone, see
/// [`cascade_comments_for_author`].
pub async fn cascade_reviews_for_author(
    tx: &mut Transaction<'_, Postgres>,
    author_id: DbId,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM reviews WHERE author_id = $1")
        .bind(author_id)
        .execute(&mut **tx)
        .await?;
    tracing::debug!(
        author_id,
        reviews = result.rows_affected(),
        "Deleted reviews by author"
    );
    Ok(result.rows_affected())
}

/// Clear `reviews.title_id` for every review of a title.
pub async fn nullify_review_title(
    tx: &mut Transaction<'_, Postgres>,
    title_id: DbId,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE reviews SET title_id = NULL WHERE title_id = $1")
        .bind(title_id)
        .execute(&mut **tx)
        .await?;
    tracing::debug!(
        title_id,
        reviews = result.rows_affected(),
        "Detached reviews from title"
    );
    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// Comment -> User / Review
// ---------------------------------------------------------------------------

/// Delete every comment written by `author_id`, together with every comment
/// on `author_review_ids` (the author's own reviews, whoever replied).
///
/// Both sets are locked in one id-ordered pass before the delete. Two authors
/// who replied to each other can then be deleted concurrently: the second
/// transaction waits on the first instead of deadlocking.
pub async fn cascade_comments_for_author(
    tx: &mut Transaction<'_, Postgres>,
    author_id: DbId,
    author_review_ids: &[DbId],
) -> Result<u64, sqlx::Error> {
    let comment_ids = sqlx::query_scalar::<_, DbId>(
        "SELECT id FROM comments \
         WHERE author_id = $1 OR review_id = ANY($2) \
         ORDER BY id \
         FOR UPDATE",
    )
    .bind(author_id)
    .bind(author_review_ids)
    .fetch_all(&mut **tx)
    .await?;

    if comment_ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query("DELETE FROM comments WHERE id = ANY($1)")
        .bind(&comment_ids)
        .execute(&mut **tx)
        .await?;
    tracing::debug!(
        author_id,
        reviews = author_review_ids.len(),
        comments = result.rows_affected(),
        "Deleted comments by author and on their reviews"
    );
    Ok(result.rows_affected())
}

/// Delete every comment on any of `review_ids`.
///
/// Locks in id order, like [`cascade_comments_for_author`].
pub async fn cascade_comments_for_reviews(
    tx: &mut Transaction<'_, Postgres>,
    review_ids: &[DbId],
) -> Result<u64, sqlx::Error> {
    let comment_ids = sqlx::query_scalar::<_, DbId>(
        "SELECT id FROM comments WHERE review_id = ANY($1) ORDER BY id FOR UPDATE",
    )
    .bind(review_ids)
    .fetch_all(&mut **tx)
    .await?;

    let result = sqlx::query("DELETE FROM comments WHERE id = ANY($1)")
        .bind(&comment_ids)
        .execute(&mut **tx)
        .await?;
    tracing::debug!(
        reviews = review_ids.len(),
        comments = result.rows_affected(),
        "Deleted comments on reviews"
    );
    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Lock a parent row for the rest of the transaction.
///
/// `table` is interpolated into the SQL, so callers must pass a literal
/// table name, never input.
/// Holding `FOR UPDATE` blocks concurrent inserts that would reference the
/// row, so no new dependent can appear between the handlers and the final
/// `DELETE`. Returns `false` if the row does not exist.
pub(crate) async fn lock_row(
    tx: &mut Transaction<'_, Postgres>,
    table: &'static str,
    id: DbId,
) -> Result<bool, sqlx::Error> {
    let query = format!("SELECT id FROM {table} WHERE id = $1 FOR UPDATE");
    let row = sqlx::query_scalar::<_, DbId>(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_parent_has_rules() {
        for parent in ["categories", "genres", "titles", "reviews", "users"] {
            assert!(rules_for(parent).next().is_some(), "{parent} has no rules");
        }
    }

    #[test]
    fn user_content_cascades_with_author() {
        let actions: Vec<_> = rules_for("users").map(|r| r.action).collect();
        assert_eq!(actions, vec![DeleteAction::Cascade, DeleteAction::Cascade]);
    }

    #[test]
    fn content_about_a_title_survives_it() {
        let review_rule = rules_for("titles")
            .find(|r| r.child_table == "reviews")
            .unwrap();
        assert_eq!(review_rule.action, DeleteAction::SetNull);
    }

    #[test]
    fn category_deletion_keeps_titles() {
        let rules: Vec<_> = rules_for("categories").collect();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].child_table, "titles");
        assert_eq!(rules[0].action, DeleteAction::SetNull);
    }
}
