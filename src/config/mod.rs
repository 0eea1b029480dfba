//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `CLASS_BOOKING_` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use class_booking::config::AppConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! config.validate()?;
//!
//! let addr = config.server.socket_addr()?;
//! tracing::info!(address = %addr, "Server listening");
//! # Ok(())
//! # }
//! ```

mod database;
mod error;
mod server;
mod storage;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, LogFormat, ServerConfig};
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend selection
    #[serde(default)]
    pub storage: StorageConfig,

    /// Database configuration, required by the postgres backend
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CLASS_BOOKING` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CLASS_BOOKING__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CLASS_BOOKING__STORAGE__BACKEND=postgres` -> `storage.backend = postgres`
    /// - `CLASS_BOOKING__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CLASS_BOOKING")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid, or
    /// if the postgres backend is selected without a `database` section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        match (&self.storage.backend, &self.database) {
            (StorageBackend::Postgres, None) => {
                return Err(ValidationError::MissingRequired("DATABASE_URL"))
            }
            (_, Some(database)) => database.validate()?,
            (StorageBackend::Memory, None) => {}
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 5] = [
        "CLASS_BOOKING__SERVER__PORT",
        "CLASS_BOOKING__SERVER__ENVIRONMENT",
        "CLASS_BOOKING__SERVER__LOG_FORMAT",
        "CLASS_BOOKING__STORAGE__BACKEND",
        "CLASS_BOOKING__DATABASE__URL",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn load_with(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        for (key, value) in vars {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn test_defaults_use_memory_backend() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.database.is_none());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_server_port() {
        let config = load_with(&[("CLASS_BOOKING__SERVER__PORT", "3000")]).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_is_production() {
        let config = load_with(&[("CLASS_BOOKING__SERVER__ENVIRONMENT", "production")]).unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_json_log_format() {
        let config = load_with(&[("CLASS_BOOKING__SERVER__LOG_FORMAT", "json")]).unwrap();
        assert_eq!(config.server.log_format, LogFormat::Json);
    }

    #[test]
    fn test_postgres_backend_with_database() {
        let config = load_with(&[
            ("CLASS_BOOKING__STORAGE__BACKEND", "postgres"),
            ("CLASS_BOOKING__DATABASE__URL", "postgresql://test@localhost/test"),
        ])
        .unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(
            config.database.as_ref().map(|db| db.url.as_str()),
            Some("postgresql://test@localhost/test")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgres_backend_requires_database() {
        let config = load_with(&[("CLASS_BOOKING__STORAGE__BACKEND", "postgres")]).unwrap();
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("DATABASE_URL"))
        );
    }
}
