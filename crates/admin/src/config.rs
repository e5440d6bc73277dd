use std::path::PathBuf;

/// Admin configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Connection string handed to the engine.
    pub connection: String,
    /// Directory a relative `Data Source` is resolved against.
    pub data_dir: PathBuf,
}

impl AdminConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `WIKISTORE_CONNECTION` | `Data Source=wiki.db`   |
    /// | `WIKISTORE_DATA_DIR`   | current directory       |
    pub fn from_env() -> Self {
        let connection =
            std::env::var("WIKISTORE_CONNECTION").unwrap_or_else(|_| "Data Source=wiki.db".into());

        let data_dir = std::env::var("WIKISTORE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        Self {
            connection,
            data_dir,
        }
    }
}
