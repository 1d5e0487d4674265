//! API route definitions.

mod geo;
mod health;
mod logs;
mod stats;

use axum::Router;
use axum::routing::get;

use crate::state::AppState;

/// Build the complete API router.
///
/// # Route Structure
///
/// - `GET /health` - Health check
/// - `GET /api/v1/logs` - Paginated recent events
/// - `GET /api/v1/stats` - Database size and table statistics
/// - `GET /api/v1/geo/{ip}` - Geolocation record for an IP
pub fn router(state: AppState) -> Router {
    let public = Router::new().route("/health", get(health::health_check));

    let api_v1 = Router::new()
        .route("/logs", get(logs::list_logs))
        .route("/stats", get(stats::overview))
        .route("/geo/{ip}", get(geo::get_geo));

    Router::new()
        .merge(public)
        .nest("/api/v1", api_v1)
        .with_state(state)
}
