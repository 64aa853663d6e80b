use yamdb_core::error::CoreError;

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL SQLSTATE for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL SQLSTATE for `check_violation`.
const CHECK_VIOLATION: &str = "23514";

/// Error returned by every repository operation.
///
/// Constraint failures are classified by SQLSTATE so callers can tell a
/// duplicate slug from a dangling reference without string matching.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Input rejected before reaching the database.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Duplicate value violates unique constraint: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Referenced row does not exist: {constraint}")]
    ForeignKeyViolation { constraint: String },

    #[error("Value violates check constraint: {constraint}")]
    CheckViolation { constraint: String },

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl DbError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. })
    }

    /// True for input that failed validation, whether caught in Rust or by a `CHECK`.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DbError::Core(CoreError::Validation(_)) | DbError::CheckViolation { .. }
        )
    }

    /// Name of the violated constraint, if this is a constraint failure.
    pub fn constraint(&self) -> Option<&str> {
        match self {
            DbError::UniqueViolation { constraint }
            | DbError::ForeignKeyViolation { constraint }
            | DbError::CheckViolation { constraint } => Some(constraint),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return DbError::UniqueViolation { constraint },
                Some(FOREIGN_KEY_VIOLATION) => return DbError::ForeignKeyViolation { constraint },
                Some(CHECK_VIOLATION) => return DbError::CheckViolation { constraint },
                _ => {}
            }
        }
        DbError::Database(err)
    }
}
