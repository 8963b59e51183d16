//! Dashboard Routes
//!
//! - GET /            - Rendered dashboard page
//! - POST /refresh    - Run one update cycle now
//! - GET /api/status  - Updater status

use axum::{extract::State, http::Uri, response::Html, Json};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::updater::{CycleReport, UpdaterStatus};

/// GET /
pub async fn page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.updater.html().await)
}

/// POST /refresh
///
/// Manual trigger. May overlap a scheduled cycle.
pub async fn refresh(State(state): State<Arc<AppState>>) -> Json<CycleReport> {
    tracing::info!("Manual refresh requested");
    Json(state.updater.update().await)
}

/// GET /api/status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<UpdaterStatus> {
    Json(state.updater.status().await)
}

/// Fallback for unknown paths
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
