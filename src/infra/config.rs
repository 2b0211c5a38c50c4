//! For reading application configuration.

use serde::Deserialize;
use std::time::Duration;

/// Application configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Greeting storage configuration.
    pub storage: StorageConfig,
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// Server address.
    pub http_address: String,
    /// Server http port.
    pub http_port: u16,
}

/// Which backend serves greeting lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// An in-process map preloaded with the stock greetings.
    Memory,
    /// The Postgres greeting table.
    Postgres,
}

/// Greeting storage configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct StorageConfig {
    /// The backend greeting lookups go to.
    pub backend: StorageBackend,
    /// The greeting table name.
    /// Overridable through `APP__STORAGE__TABLE`.
    pub table: String,
    /// How long a single storage call may take.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Postgres connection settings.
    pub postgres: DatabaseConfig,
}

/// Database configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    /// The database username.
    pub username: String,
    /// The database password.
    pub password: String,
    /// The database port.
    pub port: u16,
    /// The database name.
    pub database_name: String,
    /// The database host.
    pub host: String,
}

/// Retrieve [`Config`] from the default configuration file.
#[tracing::instrument]
pub fn load_config() -> color_eyre::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::with_name("config"))
        .add_source(config::Environment::with_prefix("app").separator("__"))
        .build()?
        .try_deserialize()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_config_reads_defaults() {
        let config = load_config().unwrap();
        assert_eq!(StorageBackend::Memory, config.storage.backend);
        assert_eq!("greetings", config.storage.table);
        assert_eq!(Duration::from_secs(5), config.storage.timeout);
        assert_eq!(3001, config.server.http_port);
    }
}
