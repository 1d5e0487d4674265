//! Error types shared across the Minerva crates.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading shared resources.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file missing or semantically invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// TOML syntax error in the configuration file.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
