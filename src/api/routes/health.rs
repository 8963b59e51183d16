//! Health Routes
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health      - Health summary

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::api::state::AppState;

/// Health summary body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" once a cycle refreshed at least one indicator, else "degraded"
    pub status: String,
    /// Completed update cycles
    pub cycles: u64,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

/// GET /health/live
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = state.updater.status().await;

    let healthy = status
        .last_cycle
        .as_ref()
        .map(|cycle| !cycle.updated.is_empty())
        .unwrap_or(false);

    Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        cycles: status.cycles,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
