//! Command executor: runs single statements against the pool.
//!
//! Every call checks a connection out of the pool for the duration of the
//! statement and hands it back on every exit path. Row streams keep their
//! connection until the stream is dropped, whether it was exhausted or not.
//!
//! Failures are logged with the name of the operation that issued the
//! statement and returned as a classified [`DbError`].

use futures::stream::{BoxStream, StreamExt};
use sqlx::query::{Query, QueryAs, QueryScalar};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Sqlite};

use crate::error::{DbError, DbResult};
use crate::DbPool;

/// A statement without typed output.
pub type Statement<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// A statement mapping every row into `O`.
pub type RowsStatement<'q, O> = QueryAs<'q, Sqlite, O, SqliteArguments<'q>>;

/// A statement returning a single column.
pub type ScalarStatement<'q, O> = QueryScalar<'q, Sqlite, O, SqliteArguments<'q>>;

/// Executes scalar, row and change statements outside of a transaction.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    pool: DbPool,
}

impl CommandExecutor {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Run a statement and return the first column of the first row, or
    /// `None` when it produced no row.
    pub async fn scalar<'q, O>(
        &self,
        operation: &'static str,
        statement: ScalarStatement<'q, O>,
    ) -> DbResult<Option<O>>
    where
        O: Send + Unpin,
        (O,): Send + Unpin + for<'r> FromRow<'r, SqliteRow>,
    {
        statement
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| log_failure(operation, err))
    }

    /// Run a statement expected to produce at most one row.
    pub async fn fetch_optional<'q, O>(
        &self,
        operation: &'static str,
        statement: RowsStatement<'q, O>,
    ) -> DbResult<Option<O>>
    where
        O: Send + Unpin + for<'r> FromRow<'r, SqliteRow>,
    {
        statement
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| log_failure(operation, err))
    }

    /// Run a statement and collect every row.
    pub async fn fetch_all<'q, O>(
        &self,
        operation: &'static str,
        statement: RowsStatement<'q, O>,
    ) -> DbResult<Vec<O>>
    where
        O: Send + Unpin + for<'r> FromRow<'r, SqliteRow>,
    {
        statement
            .fetch_all(&self.pool)
            .await
            .map_err(|err| log_failure(operation, err))
    }

    /// Run a statement and return a forward-only, single-pass stream of rows.
    ///
    /// The pooled connection is released when the stream is dropped.
    pub fn rows<'e, O>(
        &'e self,
        operation: &'static str,
        statement: RowsStatement<'e, O>,
    ) -> BoxStream<'e, DbResult<O>>
    where
        O: Send + Unpin + for<'r> FromRow<'r, SqliteRow> + 'e,
    {
        statement
            .fetch(&self.pool)
            .map(move |row| row.map_err(|err| log_failure(operation, err)))
            .boxed()
    }

    /// Run a non-query statement and return the number of affected rows.
    pub async fn execute<'q>(
        &self,
        operation: &'static str,
        statement: Statement<'q>,
    ) -> DbResult<u64> {
        statement
            .execute(&self.pool)
            .await
            .map(|result| result.rows_affected())
            .map_err(|err| log_failure(operation, err))
    }

    /// Run a non-query statement that must affect exactly `expected` rows.
    pub async fn execute_expecting<'q>(
        &self,
        operation: &'static str,
        statement: Statement<'q>,
        expected: u64,
    ) -> DbResult<()> {
        let affected = self.execute(operation, statement).await?;
        if affected != expected {
            tracing::warn!(source = "executor", operation, expected, affected, "Unexpected affected row count");
            return Err(DbError::rows_mismatch(operation, expected, affected));
        }
        Ok(())
    }
}

/// Log a driver failure and turn it into a classified [`DbError`].
pub(crate) fn log_failure(operation: &'static str, err: sqlx::Error) -> DbError {
    let err = DbError::classify(operation, err);
    if err.is_constraint() {
        tracing::warn!(source = "executor", operation, error = %err, "Statement rejected by constraint");
    } else {
        tracing::error!(source = "executor", operation, error = %err, "Statement failed");
    }
    err
}
