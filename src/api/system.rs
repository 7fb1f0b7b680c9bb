//! System endpoints: liveness and a status summary.

use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, HealthStatus, SystemStatus};

/// Reports whether the service and its database answer.
///
/// # Endpoint
/// `GET /api/health` (no authentication)
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<HealthStatus>>) {
    match state.store().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success(HealthStatus {
                status: "ok",
                database: "ok",
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::success(HealthStatus {
                    status: "degraded",
                    database: "unreachable",
                })),
            )
        }
    }
}

/// Returns version, uptime and item count.
///
/// # Endpoint
/// `GET /api/system/status`
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let item_count = state.inventory_service().count().await?;
    let metrics_enabled = state.config().read().await.observability.metrics_enabled;

    Ok(Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        item_count,
        metrics_enabled,
    })))
}
