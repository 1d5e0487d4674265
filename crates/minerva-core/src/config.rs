//! TOML configuration shared by the ingest and serve binaries.
//!
//! Configuration lives in a TOML file (default `minerva_config.toml`):
//!
//! ```toml
//! [database]
//! host = "localhost"
//! port = 5432
//! user = "minerva"
//! password = "secret"
//! name = "minerva"
//! ```
//!
//! Two environment variables are hard overrides when set:
//! - `MINERVA_DB_NAME` replaces `database.name`
//! - `MINERVA_DB_PORT` replaces `database.port`

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Application configuration loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
}

/// Database connection parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
}

impl Config {
    /// Load and parse the configuration from the given path, then apply
    /// environment overrides.
    ///
    /// A missing file is a distinct error from an unreadable or unparsable
    /// one, so callers can report it cleanly at startup.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::Config(format!(
                "config file not found at {}",
                path.display()
            )));
        }

        let raw = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&raw)?;
        config.apply_env_overrides();

        tracing::info!(
            host = %config.database.host,
            port = config.database.port,
            db = %config.database.name,
            "configuration loaded"
        );

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(name) = std::env::var("MINERVA_DB_NAME") {
            if !name.is_empty() {
                self.database.name = name;
            }
        }
        if let Ok(port) = std::env::var("MINERVA_DB_PORT") {
            match port.parse() {
                Ok(port) => self.database.port = port,
                Err(_) => {
                    tracing::warn!(value = %port, "ignoring unparsable MINERVA_DB_PORT");
                }
            }
        }
    }
}
