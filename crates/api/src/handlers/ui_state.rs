//! Handlers for persisted UI state (folder tree and header sections).
//!
//! These routes sit behind the sliding-window rate limiter; the sidebar
//! calls them on every expand/collapse.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use airprompts_core::error::CoreError;
use airprompts_core::validation;
use airprompts_db::models::ui_state::{
    FolderUiState, HeaderUiState, SetFolderUiState, SetHeaderUiState,
};
use airprompts_db::repositories::{FolderRepo, UiStateRepo};

use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/ui-state/folders
pub async fn list_folder_states(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<FolderUiState>>> {
    let states = UiStateRepo::list_folder_states(&state.pool).await?;
    Ok(ApiResponse::ok(states))
}

/// POST /api/ui-state/folders
pub async fn set_folder_state(
    State(state): State<AppState>,
    Json(input): Json<SetFolderUiState>,
) -> AppResult<ApiResponse<FolderUiState>> {
    if FolderRepo::find_by_id(&state.pool, input.folder_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Folder",
            id: input.folder_id,
        }));
    }
    let saved =
        UiStateRepo::set_folder_state(&state.pool, input.folder_id, input.expanded).await?;
    Ok(ApiResponse::ok(saved))
}

/// DELETE /api/ui-state/folders/{folder_id}
pub async fn clear_folder_state(
    State(state): State<AppState>,
    Path(folder_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let cleared = UiStateRepo::clear_folder_state(&state.pool, folder_id).await?;
    if cleared {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "FolderUiState",
            id: folder_id,
        }))
    }
}

/// GET /api/ui-state/headers
pub async fn list_header_states(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<HeaderUiState>>> {
    let states = UiStateRepo::list_header_states(&state.pool).await?;
    Ok(ApiResponse::ok(states))
}

/// POST /api/ui-state/headers
pub async fn set_header_state(
    State(state): State<AppState>,
    Json(input): Json<SetHeaderUiState>,
) -> AppResult<ApiResponse<HeaderUiState>> {
    validation::validate_header_type(&input.header_type)?;
    let saved =
        UiStateRepo::set_header_state(&state.pool, &input.header_type, input.expanded).await?;
    Ok(ApiResponse::ok(saved))
}
