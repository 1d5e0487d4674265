//! Core types and parsing for the Minerva firewall-log pipeline.
//!
//! This crate provides:
//! - The [`LogEvent`] and [`GeoData`] domain records
//! - Log line classification and field extraction
//! - TOML configuration with environment overrides
//! - Shared error types

pub mod config;
mod error;
mod event;
pub mod parse;

pub use config::{Config, DatabaseConfig};
pub use error::{Error, Result};
pub use event::{GeoData, LogEvent, UNKNOWN};
