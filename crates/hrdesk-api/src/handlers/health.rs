//! Health check handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use crate::dto::response::{ApiResponse, HealthResponse, ReadinessResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// GET /api/health/ready
pub async fn readiness(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<ReadinessResponse>>) {
    let database_up = match state.db.health_check().await {
        Ok(up) => up,
        Err(e) => {
            warn!(error = %e, "Readiness probe could not reach the database");
            false
        }
    };

    let (status, body) = if database_up {
        (StatusCode::OK, ("ok", "connected"))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, ("degraded", "unavailable"))
    };

    (
        status,
        Json(ApiResponse::ok(ReadinessResponse {
            status: body.0.to_string(),
            database: body.1.to_string(),
        })),
    )
}
