//! Handlers for feature-flag evaluation and overrides.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use ts_rs::TS;

use airprompts_core::flags::FlagEvaluation;

use crate::error::AppResult;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FlagQueryParams {
    /// Stable client identity used for percentage rollouts.
    pub user_id: Option<String>,
}

/// GET /api/flags
///
/// Evaluates every known flag for the given (optional) user identity.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<FlagQueryParams>,
) -> AppResult<ApiResponse<Vec<FlagEvaluation>>> {
    let evaluations = state.flags.evaluate_all(params.user_id.as_deref());
    Ok(ApiResponse::ok(evaluations))
}

/// Request body for a flag override.
#[derive(Debug, Deserialize, TS)]
pub struct SetOverrideRequest {
    pub enabled: bool,
}

/// PUT /api/flags/{name}/override
pub async fn set_override(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(input): Json<SetOverrideRequest>,
) -> AppResult<ApiResponse<FlagEvaluation>> {
    let evaluation = state.flags.set_override(&name, input.enabled)?;
    tracing::info!(flag = %name, enabled = input.enabled, "Flag override set");
    Ok(ApiResponse::ok(evaluation))
}

/// DELETE /api/flags/overrides
pub async fn clear_overrides(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.flags.clear_overrides()?;
    tracing::info!("Flag overrides cleared");
    Ok(StatusCode::NO_CONTENT)
}
