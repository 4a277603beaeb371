//! Health Routes
//!
//! - GET /ping - Connectivity check used by the client
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (ready to serve traffic)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{HealthResponse, PingResponse};
use crate::api::state::AppState;

/// GET /ping
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "pong".to_string(),
    })
}

/// GET /health/live
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Not ready when a client directory is configured but has no build.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if client_ok(&state) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = if client_ok(&state) { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        items: state.items.len().await,
        serves_client: state.client.is_some(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn client_ok(state: &AppState) -> bool {
    state
        .client
        .as_ref()
        .map_or(true, |shell| shell.client_dir().join("index.html").is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ping() {
        let Json(body) = ping().await;
        assert_eq!(body.message, "pong");
    }
}
