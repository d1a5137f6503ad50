//! Health check handler

use analytics_service::HealthResponse;
use axum::Json;

/// Liveness check
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok("Analytics dashboard is running"))
}
