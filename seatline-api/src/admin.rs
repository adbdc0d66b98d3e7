use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AppError, AppJson};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AdminCodeRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyCodeResponse {
    pub valid: bool,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub cleared: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/codes/verify", post(verify_code))
        .route("/v1/admin/reset", post(reset_all))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/admin/codes/verify
async fn verify_code(
    State(state): State<AppState>,
    AppJson(req): AppJson<AdminCodeRequest>,
) -> Result<Json<VerifyCodeResponse>, AppError> {
    let valid = state.desk.verify_code(&req.code).await?;
    Ok(Json(VerifyCodeResponse { valid }))
}

/// POST /v1/admin/reset
///
/// No lockout or rate limit: the shared code is the only gate.
async fn reset_all(
    State(state): State<AppState>,
    AppJson(req): AppJson<AdminCodeRequest>,
) -> Result<Json<ResetResponse>, AppError> {
    let cleared = state.desk.reset_all(&req.code).await?;
    info!("Reset via API cleared {} bookings", cleared);
    Ok(Json(ResetResponse { cleared }))
}
