//! Transaction guard for multi-statement operations.
//!
//! A guard owns one pooled connection with an open transaction. Statements run
//! through it accumulate their affected-row counts; [`TransactionGuard::commit_if`]
//! commits only when the total meets the operation's [`Expect`]ation and rolls
//! back otherwise. A guard dropped before commit (for example when a statement
//! fails and `?` returns early) rolls back.

use std::fmt;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Sqlite, Transaction};

use crate::error::{DbError, DbResult};
use crate::executor::{log_failure, CommandExecutor, RowsStatement, ScalarStatement, Statement};

/// Success threshold on the accumulated affected-row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Exactly(u64),
    AtLeast(u64),
}

impl Expect {
    pub fn is_met(self, affected: u64) -> bool {
        match self {
            Expect::Exactly(n) => affected == n,
            Expect::AtLeast(n) => affected >= n,
        }
    }
}

impl fmt::Display for Expect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expect::Exactly(n) => write!(f, "exactly {n}"),
            Expect::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// An open transaction plus the running affected-row total of one operation.
pub struct TransactionGuard {
    tx: Transaction<'static, Sqlite>,
    operation: &'static str,
    affected: u64,
}

impl TransactionGuard {
    /// Check out a connection and begin a transaction on it.
    pub async fn begin(executor: &CommandExecutor, operation: &'static str) -> DbResult<Self> {
        let tx = executor.pool().begin().await.map_err(|source| {
            tracing::error!(source = "transaction", operation, error = %source, "Begin failed");
            DbError::Transaction {
                stage: "begin",
                source,
            }
        })?;
        Ok(Self {
            tx,
            operation,
            affected: 0,
        })
    }

    /// Rows affected so far.
    pub fn affected(&self) -> u64 {
        self.affected
    }

    /// Run a non-query statement, adding its count to the running total.
    pub async fn execute<'q>(&mut self, statement: Statement<'q>) -> DbResult<u64> {
        let affected = statement
            .execute(&mut *self.tx)
            .await
            .map(|result| result.rows_affected())
            .map_err(|err| log_failure(self.operation, err))?;
        self.affected += affected;
        Ok(affected)
    }

    /// Run a non-query statement that must, on its own, affect exactly
    /// `expected` rows.
    pub async fn execute_expecting<'q>(
        &mut self,
        statement: Statement<'q>,
        expected: u64,
    ) -> DbResult<()> {
        let affected = self.execute(statement).await?;
        if affected != expected {
            tracing::warn!(source = "transaction", operation = self.operation, expected, affected, "Statement missed its row count");
            return Err(DbError::rows_mismatch(self.operation, expected, affected));
        }
        Ok(())
    }

    /// Read a single column inside the transaction.
    pub async fn scalar<'q, O>(&mut self, statement: ScalarStatement<'q, O>) -> DbResult<Option<O>>
    where
        O: Send + Unpin,
        (O,): Send + Unpin + for<'r> FromRow<'r, SqliteRow>,
    {
        statement
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|err| log_failure(self.operation, err))
    }

    /// Read at most one row inside the transaction.
    pub async fn fetch_optional<'q, O>(&mut self, statement: RowsStatement<'q, O>) -> DbResult<Option<O>>
    where
        O: Send + Unpin + for<'r> FromRow<'r, SqliteRow>,
    {
        statement
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|err| log_failure(self.operation, err))
    }

    /// Read every row inside the transaction.
    pub async fn fetch_all<'q, O>(&mut self, statement: RowsStatement<'q, O>) -> DbResult<Vec<O>>
    where
        O: Send + Unpin + for<'r> FromRow<'r, SqliteRow>,
    {
        statement
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|err| log_failure(self.operation, err))
    }

    /// Commit unconditionally.
    pub async fn commit(self) -> DbResult<u64> {
        let Self {
            tx,
            operation,
            affected,
        } = self;
        tx.commit().await.map_err(|source| {
            tracing::error!(source = "transaction", operation, error = %source, "Commit failed");
            DbError::Transaction {
                stage: "commit",
                source,
            }
        })?;
        Ok(affected)
    }

    /// Undo every statement run through this guard.
    pub async fn rollback(self) -> DbResult<()> {
        let operation = self.operation;
        self.tx.rollback().await.map_err(|source| {
            tracing::error!(source = "transaction", operation, error = %source, "Rollback failed");
            DbError::Transaction {
                stage: "rollback",
                source,
            }
        })
    }

    /// Commit if the accumulated total meets `expect`, otherwise roll back and
    /// report a constraint failure.
    pub async fn commit_if(self, expect: Expect) -> DbResult<u64> {
        let (operation, affected) = (self.operation, self.affected);
        if expect.is_met(affected) {
            return self.commit().await;
        }
        tracing::warn!(source = "transaction", operation, expected = %expect, affected, "Rolling back");
        self.rollback().await?;
        Err(DbError::rows_mismatch(operation, expect, affected))
    }
}
