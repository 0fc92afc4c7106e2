/// Health check endpoint
///
/// Verifies the server is running and the database answers.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "migrations_up_to_date": true,
///   "pool": { "active_connections": 1, "idle_connections": 4, "total_connections": 5 }
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use fitstudio_shared::db::{
    migrations::get_migration_status,
    pool::{get_pool_stats, health_check as db_health_check, PoolStats},
};
use serde::Serialize;
use tracing::warn;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,

    /// Whether every embedded migration has been applied (absent when the
    /// database is unreachable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrations_up_to_date: Option<bool>,

    /// Connection pool statistics
    pub pool: PoolStats,
}

/// Health check handler
///
/// Reports `degraded` instead of failing when the database is down, so load
/// balancers still get a response body.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let connected = match db_health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            false
        }
    };

    let migrations_up_to_date = if connected {
        get_migration_status(&state.db)
            .await
            .map(|status| status.is_up_to_date)
            .ok()
    } else {
        None
    };

    Ok(Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
        migrations_up_to_date,
        pool: get_pool_stats(&state.db),
    }))
}
