//! Database statistics endpoint.

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use sqlx::FromRow;

use crate::error::ApiError;
use crate::state::AppState;

/// Per-table statistics.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TableStats {
    pub name: String,
    pub row_count: i64,
    pub size: String,
}

/// Statistics response.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub database_size: String,
    pub tables: Vec<TableStats>,
}

/// Statistics response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct StatsEnvelope {
    pub data: StatsResponse,
}

/// `GET /api/v1/stats`
///
/// Returns the database size and live row counts per user table, largest
/// first. Row counts come from the statistics collector, so they are
/// approximate but cheap.
pub async fn overview(State(state): State<AppState>) -> Result<Json<StatsEnvelope>, ApiError> {
    let database_size: String =
        sqlx::query_scalar("SELECT pg_size_pretty(pg_database_size(current_database()))")
            .fetch_one(&state.pool)
            .await?;

    let tables: Vec<TableStats> = sqlx::query_as(
        "SELECT c.relname AS name,
                COALESCE(s.n_live_tup, 0) AS row_count,
                pg_size_pretty(pg_total_relation_size(c.oid)) AS size
         FROM pg_class c
         JOIN pg_stat_user_tables s ON c.relname = s.relname
         ORDER BY pg_total_relation_size(c.oid) DESC",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(StatsEnvelope {
        data: StatsResponse {
            database_size,
            tables,
        },
    }))
}
