//! Health and maintenance handlers.

use crate::error::ApiResult;
use crate::files::SweepStats;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /v1/health - Health check.
///
/// Returns only non-sensitive information (status and version).
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    state.metadata.health_check().await?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}

/// POST /v1/admin/janitor - Run one temp file sweep.
pub async fn run_janitor(State(state): State<AppState>) -> ApiResult<Json<SweepStats>> {
    let stats = state.janitor.sweep().await?;
    Ok(Json(stats))
}
