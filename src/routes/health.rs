//! Liveness and informational endpoints.

use axum::Json;
use serde::Serialize;

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// Liveness probe.
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Advisory root endpoint.
pub async fn about() -> &'static str {
    "meterd usage metering service. POST /meter to ingest usage events, GET /meter for billing stats."
}
