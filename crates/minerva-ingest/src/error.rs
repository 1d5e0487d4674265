//! Error types for the ingestion pipeline.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during ingestion.
#[derive(Error, Debug)]
pub enum Error {
    /// Event failed validation before any statement was issued.
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Geolocation request or decode failure.
    #[error("geolocation request failed: {0}")]
    Geo(#[from] reqwest::Error),

    /// Geolocation provider returned a non-200 status.
    #[error("geolocation API returned status {0}")]
    GeoStatus(u16),

    /// I/O error reading input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
