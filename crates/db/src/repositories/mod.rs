//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument and return [`DbError`].
//!
//! [`DbError`]: crate::DbError

pub mod category_repo;
pub mod comment_repo;
pub mod genre_repo;
pub mod review_repo;
pub mod title_repo;
pub mod user_repo;

pub use category_repo::CategoryRepo;
pub use comment_repo::CommentRepo;
pub use genre_repo::GenreRepo;
pub use review_repo::ReviewRepo;
pub use title_repo::TitleRepo;
pub use user_repo::UserRepo;

/// Default page size for list queries.
pub(crate) const DEFAULT_LIMIT: i64 = 100;

/// Maximum page size for list queries.
pub(crate) const MAX_LIMIT: i64 = 500;

/// Resolve optional paging parameters to a clamped `(limit, offset)` pair.
pub(crate) fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}
