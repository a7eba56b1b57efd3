//! Handlers for per-folder favorite markings.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use airprompts_core::error::CoreError;
use airprompts_core::validation;
use airprompts_db::models::folder::{FolderFavorite, SetFolderFavorite};
use airprompts_db::repositories::FolderFavoriteRepo;

use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FavoriteListParams {
    pub folder_id: Option<Uuid>,
}

/// GET /api/folder-favorites
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<FavoriteListParams>,
) -> AppResult<ApiResponse<Vec<FolderFavorite>>> {
    let favorites = FolderFavoriteRepo::list(&state.pool, params.folder_id).await?;
    Ok(ApiResponse::ok(favorites))
}

/// POST /api/folder-favorites
///
/// Upserts: marking an already-favorited item updates its sort order.
pub async fn set(
    State(state): State<AppState>,
    Json(input): Json<SetFolderFavorite>,
) -> AppResult<ApiResponse<FolderFavorite>> {
    validation::validate_item_type(&input.item_type)?;
    let favorite = FolderFavoriteRepo::set(&state.pool, &input).await?;
    Ok(ApiResponse::ok(favorite))
}

/// DELETE /api/folder-favorites/{item_type}/{item_id}/{folder_id}
pub async fn remove(
    State(state): State<AppState>,
    Path((item_type, item_id, folder_id)): Path<(String, Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    validation::validate_item_type(&item_type)?;
    let removed = FolderFavoriteRepo::remove(&state.pool, &item_type, item_id, folder_id).await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "FolderFavorite",
            id: item_id,
        }))
    }
}
