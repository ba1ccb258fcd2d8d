use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

fn status(value: &'static str) -> HealthStatus {
    HealthStatus {
        status: value,
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(status("healthy")))
}

/// GET /health/live
pub async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, Json(status("alive")))
}

/// GET /health/ready
///
/// The service holds no warm state; once the router is serving it is ready.
pub async fn readiness() -> impl IntoResponse {
    (StatusCode::OK, Json(status("ready")))
}
