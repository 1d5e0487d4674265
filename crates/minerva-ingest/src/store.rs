//! Store adapter for the `log_data` and `ip_geo` tables.
//!
//! The [`EventStore`] trait is the seam between the pipeline and PostgreSQL:
//! pipeline tests run against an in-memory double, production runs against
//! [`PgStore`]. Every operation is a single statement and safe for
//! concurrent use through the shared pool.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use minerva_core::{DatabaseConfig, GeoData, LogEvent, UNKNOWN};

use crate::error::{Error, Result};

/// Maximum pooled connections: the 20 workers plus the enricher, with a
/// little slack.
const MAX_CONNECTIONS: u32 = 24;

/// Operations the pipeline needs from the relational store.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Idempotent event insert.
    ///
    /// Returns the number of rows actually inserted: 0 when the uniqueness
    /// constraint already holds the event, 1 when the row is new.
    async fn insert_event(&self, event: &LogEvent) -> Result<u64>;

    /// Whether `ip` already has a row in `ip_geo`.
    async fn geo_exists(&self, ip: &str) -> Result<bool>;

    /// Insert or replace the geolocation row for `ip`, refreshing
    /// `last_updated`.
    async fn upsert_geo(&self, ip: &str, geo: &GeoData) -> Result<()>;
}

/// Reject events that would persist sentinel values in key columns.
///
/// Runs before any statement is issued, so a rejected event never touches
/// the store.
pub fn validate_event(event: &LogEvent) -> Result<()> {
    if event.timestamp == UNKNOWN {
        return Err(Error::InvalidEvent(format!(
            "event from {} has no timestamp",
            event.source_ip
        )));
    }
    if event.destination_ip == UNKNOWN {
        return Err(Error::InvalidEvent(format!(
            "event from {} has no destination address",
            event.source_ip
        )));
    }
    Ok(())
}

/// PostgreSQL-backed store over a shared connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect a pool from the database configuration and verify it.
    ///
    /// An unreachable or misconfigured database fails here, at startup,
    /// rather than mid-pipeline.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        tracing::info!(
            host = %config.host,
            db = %config.name,
            "database pool connected"
        );

        Ok(Self { pool })
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn insert_event(&self, event: &LogEvent) -> Result<u64> {
        validate_event(event)?;

        let result = sqlx::query(
            r#"
            INSERT INTO log_data (
                timestamp, source_ip, destination_ip, protocol,
                source_port, destination_port, action, reason, packet_length, ttl
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (timestamp, source_ip, destination_ip, protocol, source_port, destination_port)
            DO NOTHING
            "#,
        )
        .bind(&event.timestamp)
        .bind(&event.source_ip)
        .bind(&event.destination_ip)
        .bind(&event.protocol)
        .bind(event.source_port)
        .bind(event.destination_port)
        .bind(&event.action)
        .bind(&event.reason)
        .bind(event.packet_length)
        .bind(event.ttl)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn geo_exists(&self, ip: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM ip_geo WHERE ip_address = $1)")
                .bind(ip)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn upsert_geo(&self, ip: &str, geo: &GeoData) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ip_geo (
                ip_address, country, region, city, isp, latitude, longitude, last_updated
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            ON CONFLICT (ip_address) DO UPDATE SET
                country = EXCLUDED.country,
                region = EXCLUDED.region,
                city = EXCLUDED.city,
                isp = EXCLUDED.isp,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                last_updated = NOW()
            "#,
        )
        .bind(ip)
        .bind(&geo.country)
        .bind(&geo.region)
        .bind(&geo.city)
        .bind(&geo.isp)
        .bind(geo.latitude)
        .bind(geo.longitude)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
