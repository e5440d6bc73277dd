//! SQLite persistence engine for wiki pages, revisions, categories,
//! discussion threads, navigation paths and snippets.
//!
//! [`PagesStore::init`] is the entry point used by the host: it parses the
//! connection string, opens the pool, verifies the store is reachable and
//! brings the schema to the current version. Operations live on the
//! zero-sized repositories in [`repositories`], each taking the store's
//! [`CommandExecutor`] as its first argument.

use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub mod config;
pub mod error;
pub mod executor;
pub mod migrations;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod transaction;

use crate::config::{DataSource, StoreConfig};
use crate::error::{DbError, DbResult};
use crate::executor::CommandExecutor;
use crate::migrations::SchemaOutcome;

pub type DbPool = sqlx::SqlitePool;

/// Create a connection pool for the configured data source.
///
/// Foreign keys are enforced on every connection. A private in-memory
/// database lives on a single connection that is never recycled.
pub async fn create_pool(config: &StoreConfig) -> Result<DbPool, sqlx::Error> {
    let (options, pool_options) = match &config.data_source {
        DataSource::File(path) => (
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
            SqlitePoolOptions::new().max_connections(config.max_connections),
        ),
        DataSource::InMemory => (
            SqliteConnectOptions::from_str("sqlite::memory:")?,
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None),
        ),
    };

    pool_options
        .connect_with(
            options
                .foreign_keys(true)
                .busy_timeout(config.busy_timeout),
        )
        .await
}

/// Verify the store answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Static description of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderInfo {
    pub name: &'static str,
    pub schema_version: &'static str,
    pub read_only: bool,
}

/// An initialized pages store.
#[derive(Debug, Clone)]
pub struct PagesStore {
    executor: CommandExecutor,
}

impl PagesStore {
    /// Initialize from the host's connection string.
    ///
    /// A relative `Data Source` is resolved against `data_dir`. Fails if the
    /// store cannot be reached or its schema cannot be brought up to date.
    pub async fn init(connection_string: &str, data_dir: &Path) -> DbResult<Self> {
        let config = StoreConfig::parse(connection_string, data_dir)?;
        Self::open(&config).await
    }

    /// Initialize from an already parsed configuration.
    pub async fn open(config: &StoreConfig) -> DbResult<Self> {
        let pool = create_pool(config).await.map_err(|err| {
            tracing::error!(source = "store", error = %err, "Failed to open the store");
            DbError::Store(err)
        })?;
        tracing::debug!(source = "store", data_source = ?config.data_source, "Connection pool created");

        health_check(&pool).await.map_err(|err| {
            tracing::error!(source = "store", error = %err, "Store health check failed");
            DbError::Store(err)
        })?;

        let executor = CommandExecutor::new(pool);
        match migrations::ensure_schema(&executor, &schema::PAGES_SCHEMA).await? {
            SchemaOutcome::Created => tracing::info!(source = "store", "Schema created"),
            SchemaOutcome::UpToDate => tracing::info!(source = "store", "Schema is up to date"),
            SchemaOutcome::Upgraded { from, to } => {
                tracing::info!(source = "store", %from, %to, "Schema upgraded")
            }
        }

        Ok(Self { executor })
    }

    /// Executor shared by every repository call on this store.
    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    /// Name and capabilities of the engine.
    pub fn information() -> ProviderInfo {
        ProviderInfo {
            name: "SQLite Pages Storage Provider",
            schema_version: schema::CURRENT_VERSION,
            read_only: false,
        }
    }

    /// Schema version currently recorded in the store.
    pub async fn schema_version(&self) -> DbResult<Option<String>> {
        migrations::read_version(&self.executor, &schema::PAGES_SCHEMA).await
    }

    /// Close every pooled connection.
    pub async fn close(self) {
        self.executor.pool().close().await;
    }
}
