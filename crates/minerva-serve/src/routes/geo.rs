//! Geolocation lookup endpoint.

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::error::ApiError;
use crate::state::AppState;

/// One row from the `ip_geo` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GeoRow {
    pub ip_address: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub isp: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Geolocation response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct GeoEnvelope {
    pub data: GeoRow,
}

/// `GET /api/v1/geo/{ip}`
///
/// Returns the stored geolocation record for an IP, or 404 if the IP has
/// never been enriched.
pub async fn get_geo(
    State(state): State<AppState>,
    Path(ip): Path<String>,
) -> Result<Json<GeoEnvelope>, ApiError> {
    let row: Option<GeoRow> = sqlx::query_as(
        "SELECT ip_address, country, region, city, isp, latitude, longitude, last_updated
         FROM ip_geo
         WHERE ip_address = $1",
    )
    .bind(&ip)
    .fetch_optional(&state.pool)
    .await?;

    match row {
        Some(data) => Ok(Json(GeoEnvelope { data })),
        None => Err(ApiError::NotFound(format!(
            "no geolocation data for {ip}"
        ))),
    }
}
