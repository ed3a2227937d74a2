//! Liveness and health endpoints.

use axum::Json;
use serde::Serialize;

/// Static liveness probe, mirrors the classic "it runs" root page.
pub async fn home() -> &'static str {
    "smsgate OTP service running"
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Basic health check (is the server running?)
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
