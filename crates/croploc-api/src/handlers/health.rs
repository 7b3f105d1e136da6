//! Health and readiness handlers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness response.
#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    /// False when credential loading failed at startup; upload and crop
    /// still work, detection endpoints return a visible warning.
    pub detection_enabled: bool,
}

/// Readiness probe.
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    Json(ReadyResponse {
        ready: true,
        detection_enabled: state.detection_enabled(),
    })
}
