use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
}

/// Database probe response payload.
#[derive(Serialize)]
pub struct DbHealthResponse {
    pub healthy: bool,
}

/// GET /health -- returns service and database health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = fixline_db::health_check(&state.pool).await.is_ok();

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

/// GET /health/db -- narrow database probe; 503 when the pool cannot
/// reach Postgres.
async fn db_health(State(state): State<AppState>) -> impl IntoResponse {
    match fixline_db::health_check(&state.pool).await {
        Ok(()) => (StatusCode::OK, Json(DbHealthResponse { healthy: true })),
        Err(err) => {
            tracing::warn!(error = %err, "Database health probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(DbHealthResponse { healthy: false }),
            )
        }
    }
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/db", get(db_health))
}
