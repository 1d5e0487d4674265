//! Application state shared by all request handlers.

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use minerva_core::DatabaseConfig;

/// Maximum pooled connections for the API server.
const MAX_CONNECTIONS: u32 = 8;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL pool for read queries.
    pub pool: PgPool,
}

impl AppState {
    /// Build the state with a lazily connecting pool.
    ///
    /// The pool opens connections on first use, so construction never
    /// blocks; call [`AppState::ping`] at startup to fail fast on an
    /// unreachable database.
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_lazy_with(options);

        Self { pool }
    }

    /// Verify the database is reachable.
    pub async fn ping(&self) -> sqlx::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
