//! Minerva Serve - HTTP API server over the ingested log corpus.
//!
//! Exposes read-only endpoints over the `log_data` and `ip_geo` tables that
//! the ingestion pipeline maintains. Uses the same TOML configuration (and
//! `MINERVA_DB_NAME` / `MINERVA_DB_PORT` overrides) as `minerva-ingest`.

use std::path::PathBuf;

use axum::http::Request;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use minerva_core::Config;
use minerva_serve::{AppState, router};

/// Minerva read-only API server.
#[derive(Parser, Debug)]
#[command(name = "minerva-serve")]
#[command(about = "HTTP API server for the Minerva log corpus", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "minerva_config.toml")]
    config: PathBuf,

    /// Server bind address.
    #[arg(long, env = "MINERVA_BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load(&args.config)?;

    let state = AppState::new(&config.database);
    state.ping().await?;

    let app = router(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::span!(
                    Level::INFO,
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    query = request.uri().query().unwrap_or("")
                )
            }),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    tracing::info!(addr = %args.bind, "starting server");

    axum::serve(listener, app).await?;

    Ok(())
}
