//! Schema version detection, creation and upgrade.
//!
//! [`ensure_schema`] runs once at initialization, before any other store
//! operation:
//!
//! 1. Probe the subsystem's primary table. If it cannot be read the store is
//!    empty: create every table and seed the version table with the current
//!    version in one transaction.
//! 2. Otherwise read the stored version. A store without a version table
//!    predates versioning; the table is created and seeded with the legacy
//!    version, and the store is treated as behind.
//! 3. If the stored version differs from the current one, resolve a chain of
//!    upgrade edges and apply them one by one. Each edge runs its statements
//!    and the version bump in its own transaction.
//!
//! Any missing edge or failed step aborts initialization.

use wikistore_core::schema_version::{resolve_upgrade_path, UpgradeEdge};

use crate::error::{DbError, DbResult};
use crate::executor::CommandExecutor;
use crate::transaction::TransactionGuard;

/// A directed upgrade step between two schema versions.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub from: &'static str,
    pub to: &'static str,
    /// DDL/DML run before the version bump.
    pub statements: &'static [&'static str],
}

impl UpgradeEdge for Migration {
    fn from_version(&self) -> &str {
        self.from
    }
    fn to_version(&self) -> &str {
        self.to
    }
}

/// Everything the engine needs to create and upgrade one versioned subsystem.
#[derive(Debug, Clone, Copy)]
pub struct SchemaDefinition {
    pub subsystem: &'static str,
    pub version_table: &'static str,
    /// Table read by the existence probe.
    pub probe_table: &'static str,
    pub current_version: &'static str,
    /// Version recorded for stores that predate the version table.
    pub legacy_version: &'static str,
    /// Creates every table of the current version, version table included.
    pub create_statements: &'static [&'static str],
    pub migrations: &'static [Migration],
}

/// What [`ensure_schema`] had to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaOutcome {
    Created,
    UpToDate,
    Upgraded { from: String, to: String },
}

/// Bring the subsystem described by `schema` to its current version.
pub async fn ensure_schema(
    executor: &CommandExecutor,
    schema: &SchemaDefinition,
) -> DbResult<SchemaOutcome> {
    if !probe(executor, schema).await? {
        create_schema(executor, schema)
            .await
            .map_err(|err| DbError::Migration {
                from: "(empty store)".into(),
                to: schema.current_version.into(),
                reason: err.to_string(),
            })?;
        return Ok(SchemaOutcome::Created);
    }

    let stored = match read_version(executor, schema).await? {
        Some(version) => version,
        None => {
            seed_legacy_version(executor, schema).await?;
            schema.legacy_version.to_string()
        }
    };

    if stored == schema.current_version {
        tracing::debug!(source = "migrations", subsystem = schema.subsystem, version = %stored, "Schema is up to date");
        return Ok(SchemaOutcome::UpToDate);
    }

    upgrade(executor, schema, &stored).await?;
    Ok(SchemaOutcome::Upgraded {
        from: stored,
        to: schema.current_version.to_string(),
    })
}

/// `true` when the primary table of the subsystem can be read.
///
/// Only a missing table means the schema is absent; any other failure, such
/// as a locked database, is returned.
async fn probe(executor: &CommandExecutor, schema: &SchemaDefinition) -> DbResult<bool> {
    let sql = format!("SELECT COUNT(*) FROM {}", schema.probe_table);
    match sqlx::query_scalar::<_, i64>(&sql)
        .fetch_one(executor.pool())
        .await
    {
        Ok(_) => Ok(true),
        Err(err) if is_missing_table(&err) => {
            tracing::debug!(source = "migrations", subsystem = schema.subsystem, error = %err, "Probe failed, schema is missing");
            Ok(false)
        }
        Err(err) => {
            tracing::error!(source = "migrations", subsystem = schema.subsystem, error = %err, "Probe failed");
            Err(DbError::Store(err))
        }
    }
}

fn is_missing_table(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.message().contains("no such table"))
}

/// Create every table of the current version and record that version.
pub async fn create_schema(executor: &CommandExecutor, schema: &SchemaDefinition) -> DbResult<()> {
    tracing::info!(source = "migrations", subsystem = schema.subsystem, version = schema.current_version, "Creating schema");

    let mut tx = TransactionGuard::begin(executor, "create_schema").await?;
    for statement in schema.create_statements {
        tx.execute(sqlx::query(statement)).await?;
    }
    // DDL leaves the connection's change counter untouched, so only the seed
    // insert is checked.
    let seed = format!("INSERT INTO {} (version) VALUES (?1)", schema.version_table);
    tx.execute_expecting(sqlx::query(&seed).bind(schema.current_version), 1)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// The version recorded in the subsystem's version table.
///
/// `Ok(None)` means the store predates versioning: the table is missing or
/// holds no row.
pub async fn read_version(
    executor: &CommandExecutor,
    schema: &SchemaDefinition,
) -> DbResult<Option<String>> {
    let sql = format!("SELECT version FROM {} LIMIT 1", schema.version_table);
    match sqlx::query_scalar::<_, String>(&sql)
        .fetch_optional(executor.pool())
        .await
    {
        Ok(version) => Ok(version),
        Err(err) if is_missing_table(&err) => Ok(None),
        Err(err) => Err(DbError::Store(err)),
    }
}

async fn seed_legacy_version(executor: &CommandExecutor, schema: &SchemaDefinition) -> DbResult<()> {
    tracing::warn!(source = "migrations", subsystem = schema.subsystem, version = schema.legacy_version, "Store has no version record, assuming legacy version");

    let mut tx = TransactionGuard::begin(executor, "seed_legacy_version").await?;
    let create = format!(
        "CREATE TABLE IF NOT EXISTS {} (version TEXT NOT NULL PRIMARY KEY)",
        schema.version_table
    );
    tx.execute(sqlx::query(&create)).await?;
    let seed = format!("INSERT INTO {} (version) VALUES (?1)", schema.version_table);
    tx.execute_expecting(sqlx::query(&seed).bind(schema.legacy_version), 1)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// Apply the chain of upgrade edges leading from `from` to the current version.
pub async fn upgrade(
    executor: &CommandExecutor,
    schema: &SchemaDefinition,
    from: &str,
) -> DbResult<()> {
    let to = schema.current_version;
    let path = resolve_upgrade_path(schema.migrations, from, to).ok_or_else(|| {
        tracing::error!(source = "migrations", subsystem = schema.subsystem, from, to, "No upgrade path");
        DbError::Migration {
            from: from.to_string(),
            to: to.to_string(),
            reason: "no upgrade path".into(),
        }
    })?;

    for index in path {
        let step = &schema.migrations[index];
        apply_step(executor, schema, step)
            .await
            .map_err(|err| DbError::Migration {
                from: step.from.to_string(),
                to: step.to.to_string(),
                reason: err.to_string(),
            })?;
    }
    Ok(())
}

async fn apply_step(
    executor: &CommandExecutor,
    schema: &SchemaDefinition,
    step: &Migration,
) -> DbResult<()> {
    tracing::info!(source = "migrations", subsystem = schema.subsystem, from = step.from, to = step.to, "Applying schema upgrade");

    let mut tx = TransactionGuard::begin(executor, "upgrade_schema").await?;
    for statement in step.statements {
        tx.execute(sqlx::query(statement)).await?;
    }
    let bump = format!("UPDATE {} SET version = ?1", schema.version_table);
    tx.execute_expecting(sqlx::query(&bump).bind(step.to), 1)
        .await?;
    tx.commit().await?;
    Ok(())
}
