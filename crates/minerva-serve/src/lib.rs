//! Minerva Serve - read-only HTTP API over the log corpus.
//!
//! This crate exposes the tables the ingestion pipeline fills:
//!
//! - `GET /health` - liveness probe
//! - `GET /api/v1/logs` - paginated recent events, newest first
//! - `GET /api/v1/stats` - database size and per-table row counts
//! - `GET /api/v1/geo/{ip}` - geolocation record for one IP, or 404
//!
//! # Architecture
//!
//! - **AppState**: shared state (PostgreSQL pool, configuration)
//! - **Routes**: endpoint handlers grouped by domain
//! - **ApiError**: error-to-response mapping with a JSON envelope

mod error;
mod routes;
mod state;

pub use self::error::ApiError;
pub use self::routes::router;
pub use self::state::AppState;
