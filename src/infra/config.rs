//! For reading application configuration.

use serde::Deserialize;
use std::time::Duration;

/// Application configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// Server address.
    pub http_address: String,
    /// Server http port.
    pub http_port: u16,
    /// How long a single request may take before it is aborted.
    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,
    /// The maximum number of requests handled at once.
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_concurrency_limit() -> usize {
    500
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_address: "127.0.0.1".to_string(),
            http_port: 8080,
            request_timeout: default_request_timeout(),
            concurrency_limit: default_concurrency_limit(),
        }
    }
}

/// Where items are stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// A PostgreSQL database.
    #[default]
    Postgres,
    /// A process-local store, lost on shutdown.
    Memory,
}

/// Database configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    /// Which repository implementation to use.
    #[serde(default)]
    pub backend: Backend,
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
    /// Whether to apply pending migrations at startup.
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_run_migrations() -> bool {
    true
}

/// Logging configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoggingConfig {
    /// Directory for hourly rolling JSON log files. Disabled if unset.
    pub directory: Option<String>,
    /// OTLP collector endpoint for exporting spans. Disabled if unset.
    pub otlp_endpoint: Option<String>,
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

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_are_filled_in() {
        let config = parse(
            r#"
            [server]
            http_address = "0.0.0.0"
            http_port = 3000

            [database]
            username = "postgres"
            password = "postgres"
            port = 5432
            database_name = "answer_king"
            host = "localhost"
            "#,
        );
        assert_eq!(Duration::from_secs(10), config.server.request_timeout);
        assert_eq!(500, config.server.concurrency_limit);
        assert_eq!(Backend::Postgres, config.database.backend);
        assert!(config.database.run_migrations);
        assert!(config.logging.directory.is_none());
        assert!(config.logging.otlp_endpoint.is_none());
    }

    #[test]
    fn explicit_values_are_read() {
        let config = parse(
            r#"
            [server]
            http_address = "0.0.0.0"
            http_port = 3000
            request_timeout = "2s 500ms"
            concurrency_limit = 8

            [database]
            backend = "memory"
            username = "postgres"
            password = "postgres"
            port = 5432
            database_name = "answer_king"
            host = "localhost"
            run_migrations = false

            [logging]
            directory = "./logs"
            "#,
        );
        assert_eq!(Duration::from_millis(2500), config.server.request_timeout);
        assert_eq!(8, config.server.concurrency_limit);
        assert_eq!(Backend::Memory, config.database.backend);
        assert!(!config.database.run_migrations);
        assert_eq!(Some("./logs"), config.logging.directory.as_deref());
    }
}
