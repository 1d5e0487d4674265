//! Minerva ingestion daemon.
//!
//! Reads firewall log lines from standard input, persists suspicious events
//! to PostgreSQL, and enriches newly observed source IPs with geolocation
//! data under the provider's rate limit.
//!
//! # Usage
//!
//! ```bash
//! # Latest-first (default: input is reversed before processing)
//! journalctl -k | minerva-ingest
//!
//! # Oldest-first, custom config
//! minerva-ingest -r --config /etc/minerva/minerva_config.toml < firewall.log
//! ```
//!
//! Progress and the final summary go to stdout; diagnostics go to stderr.
//! The exit code is 0 whenever the pipeline ran to completion, regardless
//! of per-line errors; initialization failures exit non-zero.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use minerva_core::Config;
use minerva_ingest::geo::{self, GeoClient};
use minerva_ingest::store::PgStore;
use minerva_ingest::{Pipeline, input};

/// Firewall log ingestion pipeline.
#[derive(Parser, Debug)]
#[command(name = "minerva-ingest")]
#[command(about = "Ingest firewall logs into PostgreSQL with geo enrichment")]
#[command(version)]
struct Args {
    /// Process input in original (oldest-first) order. The default reverses
    /// the input so the newest lines are handled first.
    #[arg(short = 'r', long = "no-reverse")]
    no_reverse: bool,

    /// Path to the TOML configuration file.
    #[arg(long, default_value = "minerva_config.toml")]
    config: PathBuf,

    /// Base URL of the geolocation API.
    #[arg(long, default_value = geo::DEFAULT_BASE_URL)]
    geo_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let config = Config::load(&args.config).context("failed to load configuration")?;

    let store = PgStore::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    let provider =
        GeoClient::new(&args.geo_url).context("failed to build geolocation client")?;

    let mut lines =
        input::read_lines(std::io::stdin().lock()).context("failed to read standard input")?;
    if !args.no_reverse {
        input::reverse_lines(&mut lines);
    }

    tracing::info!(
        lines = lines.len(),
        reversed = !args.no_reverse,
        geo_url = %args.geo_url,
        "input read, starting pipeline"
    );

    Pipeline::new(store, provider).run(lines).await;

    Ok(())
}
