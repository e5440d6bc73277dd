//! Connection string handling.
//!
//! The host hands the engine a single string of `key=value` pairs separated
//! by `;`, for example `Data Source=data/wiki.db; Max Pool Size=4`.
//!
//! | Key              | Required | Default |
//! |------------------|----------|---------|
//! | `Data Source`    | yes      |         |
//! | `Max Pool Size`  | no       | `5`     |
//! | `Busy Timeout`   | no       | `5` (s) |
//!
//! A relative `Data Source` is resolved against the data directory supplied
//! by the host. `:memory:` selects a private in-memory database.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{DbError, DbResult};

/// Special `Data Source` value selecting an in-memory database.
pub const IN_MEMORY: &str = ":memory:";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 5;

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    InMemory,
}

/// Parsed store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_source: DataSource,
    pub max_connections: u32,
    pub busy_timeout: Duration,
}

impl StoreConfig {
    /// Parse a connection string, resolving a relative data source against
    /// `data_dir`.
    pub fn parse(raw: &str, data_dir: &Path) -> DbResult<Self> {
        let mut data_source = None;
        let mut max_connections = DEFAULT_MAX_CONNECTIONS;
        let mut busy_timeout_secs = DEFAULT_BUSY_TIMEOUT_SECS;

        for pair in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((key, value)) = pair.split_once('=') else {
                return Err(DbError::Config(format!("Expected key=value, got '{pair}'")));
            };
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "data source" => data_source = Some(resolve_data_source(value, data_dir)?),
                "max pool size" => max_connections = parse_number(key, value)?,
                "busy timeout" => busy_timeout_secs = parse_number(key, value)?,
                other => tracing::warn!(source = "config", key = %other, "Ignoring unknown connection string key"),
            }
        }

        let data_source = data_source
            .ok_or_else(|| DbError::Config("Connection string has no 'Data Source'".into()))?;
        if max_connections == 0 {
            return Err(DbError::Config("'Max Pool Size' must be at least 1".into()));
        }

        Ok(Self {
            data_source,
            max_connections,
            busy_timeout: Duration::from_secs(busy_timeout_secs),
        })
    }

    /// Configuration of a database file at `path`, with defaults elsewhere.
    pub fn for_file(path: impl Into<PathBuf>) -> Self {
        Self {
            data_source: DataSource::File(path.into()),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout: Duration::from_secs(DEFAULT_BUSY_TIMEOUT_SECS),
        }
    }
}

fn resolve_data_source(value: &str, data_dir: &Path) -> DbResult<DataSource> {
    if value.is_empty() {
        return Err(DbError::Config("'Data Source' must not be empty".into()));
    }
    if value == IN_MEMORY {
        return Ok(DataSource::InMemory);
    }
    let path = Path::new(value);
    if path.is_absolute() {
        Ok(DataSource::File(path.to_path_buf()))
    } else {
        Ok(DataSource::File(data_dir.join(path)))
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> DbResult<T> {
    value
        .parse()
        .map_err(|_| DbError::Config(format!("'{}' must be a number, got '{value}'", key.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_is_resolved_against_data_dir() {
        let config = StoreConfig::parse("Data Source=wiki.db", Path::new("/srv/wiki")).unwrap();
        assert_eq!(
            config.data_source,
            DataSource::File(PathBuf::from("/srv/wiki/wiki.db"))
        );
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn absolute_path_is_kept() {
        let config = StoreConfig::parse("Data Source=/var/db/wiki.db", Path::new("/srv")).unwrap();
        assert_eq!(
            config.data_source,
            DataSource::File(PathBuf::from("/var/db/wiki.db"))
        );
    }

    #[test]
    fn keys_are_case_insensitive_and_trimmed() {
        let config = StoreConfig::parse(
            " data source = pages.db ; MAX POOL SIZE=2;busy timeout= 9 ;",
            Path::new("/tmp"),
        )
        .unwrap();
        assert_eq!(config.data_source, DataSource::File(PathBuf::from("/tmp/pages.db")));
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.busy_timeout, Duration::from_secs(9));
    }

    #[test]
    fn in_memory_source() {
        let config = StoreConfig::parse("Data Source=:memory:", Path::new(".")).unwrap();
        assert_eq!(config.data_source, DataSource::InMemory);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        assert!(StoreConfig::parse("Provider=Jet;Data Source=a.db", Path::new(".")).is_ok());
    }

    #[test]
    fn missing_data_source_rejected() {
        assert!(matches!(
            StoreConfig::parse("Max Pool Size=3", Path::new(".")),
            Err(DbError::Config(_))
        ));
        assert!(StoreConfig::parse("", Path::new(".")).is_err());
    }

    #[test]
    fn malformed_pairs_rejected() {
        assert!(StoreConfig::parse("Data Source", Path::new(".")).is_err());
        assert!(StoreConfig::parse("Data Source=a.db;Max Pool Size=many", Path::new(".")).is_err());
        assert!(StoreConfig::parse("Data Source=a.db;Max Pool Size=0", Path::new(".")).is_err());
        assert!(StoreConfig::parse("Data Source= ", Path::new(".")).is_err());
    }
}
