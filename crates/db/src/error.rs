use wikistore_core::error::CoreError;

/// Error type of every store operation.
///
/// Distinguishes a missing row, a constraint violation (including an
/// affected-row count below what the operation requires) and a failure of the
/// store itself, so callers can react to each case separately.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The store could not be reached or a statement failed for a reason other
    /// than a constraint.
    #[error("Store error: {0}")]
    Store(#[source] sqlx::Error),

    /// Duplicate key, missing referenced row, or a statement sequence that did
    /// not affect the rows it had to.
    #[error("Constraint violation in {operation}: {detail}")]
    Constraint {
        operation: &'static str,
        detail: String,
    },

    /// The addressed row does not exist.
    #[error("Not found: {entity} '{key}'")]
    NotFound { entity: &'static str, key: String },

    /// Begin, commit or rollback of a transaction failed.
    #[error("Transaction {stage} failed: {source}")]
    Transaction {
        stage: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// The schema could not be brought from `from` to `to`.
    #[error("Schema migration from {from} to {to} failed: {reason}")]
    Migration {
        from: String,
        to: String,
        reason: String,
    },

    /// The connection string is malformed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A domain-level validation error from `wikistore_core`.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience type alias for store results.
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Classify a driver error raised while running `operation`.
    ///
    /// Unique, primary-key, foreign-key, not-null and check violations become
    /// [`DbError::Constraint`]; everything else is a [`DbError::Store`].
    pub fn classify(operation: &'static str, err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation()
                    || db_err.is_foreign_key_violation()
                    || db_err.is_check_violation()
                    || matches!(db_err.kind(), sqlx::error::ErrorKind::NotNullViolation) =>
            {
                DbError::Constraint {
                    operation,
                    detail: db_err.message().to_string(),
                }
            }
            _ => DbError::Store(err),
        }
    }

    /// Shorthand for an affected-row count that missed its expectation.
    pub fn rows_mismatch(
        operation: &'static str,
        expected: impl std::fmt::Display,
        actual: u64,
    ) -> Self {
        DbError::Constraint {
            operation,
            detail: format!("expected {expected} affected row(s), got {actual}"),
        }
    }

    /// Shorthand for [`DbError::NotFound`].
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        DbError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// `true` for [`DbError::Constraint`].
    pub fn is_constraint(&self) -> bool {
        matches!(self, DbError::Constraint { .. })
    }
}
