//! Liveness and readiness probes.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::StatusResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Liveness health check endpoint.
///
/// Does not check dependencies.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "API is running",
        timestamp: Utc::now(),
    })
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the account store does not answer.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<StatusResponse>) {
    match state.store().ping().await {
        Ok(()) => (StatusCode::OK, Json(StatusResponse::ok("Ready"))),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(StatusResponse::failed("Account store unavailable")),
            )
        }
    }
}
