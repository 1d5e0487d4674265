//! Paginated event listing.

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the log listing.
#[derive(Debug, Clone, Deserialize)]
pub struct LogsQuery {
    /// Page size (default 50, clamped to 1-1000).
    pub limit: Option<i64>,
    /// Rows to skip (default 0).
    pub offset: Option<i64>,
}

/// One row from the `log_data` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LogRow {
    pub timestamp: String,
    pub source_ip: String,
    pub destination_ip: String,
    pub protocol: String,
    pub source_port: i32,
    pub destination_port: i32,
    pub action: String,
    pub reason: String,
    pub packet_length: i32,
    pub ttl: i32,
}

/// Log listing response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct LogsResponse {
    pub data: Vec<LogRow>,
    pub limit: i64,
    pub offset: i64,
}

/// `GET /api/v1/logs?limit=&offset=`
///
/// Returns recent events, newest first.
pub async fn list_logs(
    State(state): State<AppState>,
    Query(params): Query<LogsQuery>,
) -> Result<Json<LogsResponse>, ApiError> {
    let limit = params.limit.unwrap_or(50).clamp(1, 1000);
    let offset = params.offset.unwrap_or(0).max(0);

    let data: Vec<LogRow> = sqlx::query_as(
        "SELECT timestamp, source_ip, destination_ip, protocol,
                source_port, destination_port, action, reason, packet_length, ttl
         FROM log_data
         ORDER BY timestamp DESC
         LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(LogsResponse {
        data,
        limit,
        offset,
    }))
}
