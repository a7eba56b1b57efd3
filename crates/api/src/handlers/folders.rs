//! Handlers for the `/folders` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use ts_rs::TS;
use uuid::Uuid;

use airprompts_core::error::CoreError;
use airprompts_core::validation;
use airprompts_db::models::folder::{
    CreateFolder, Folder, FolderWithCounts, SortOrderUpdate, UpdateFolder,
};
use airprompts_db::repositories::FolderRepo;

use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/folders
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<FolderWithCounts>>> {
    let folders = FolderRepo::list_with_counts(&state.pool).await?;
    Ok(ApiResponse::ok(folders))
}

/// POST /api/folders
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateFolder>,
) -> AppResult<(StatusCode, ApiResponse<Folder>)> {
    validation::validate_name(&input.name)?;
    if let Some(parent_id) = input.parent_id {
        if FolderRepo::find_by_id(&state.pool, parent_id).await?.is_none() {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Folder",
                id: parent_id,
            }));
        }
    }
    let folder = FolderRepo::create(&state.pool, &input).await?;
    tracing::info!(folder_id = %folder.id, name = %folder.name, "Folder created");
    Ok(ApiResponse::created(folder))
}

/// PUT /api/folders/{id}
///
/// Rejects re-parenting that would make the folder its own ancestor.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateFolder>,
) -> AppResult<ApiResponse<Folder>> {
    if let Some(name) = &input.name {
        validation::validate_name(name)?;
    }
    if let Some(new_parent) = input.parent_id {
        if FolderRepo::find_by_id(&state.pool, new_parent).await?.is_none() {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Folder",
                id: new_parent,
            }));
        }
        if FolderRepo::would_create_cycle(&state.pool, id, new_parent).await? {
            return Err(AppError::Core(CoreError::Validation(
                "circular folder parenting is not allowed".to_string(),
            )));
        }
    }

    let folder = FolderRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Folder",
            id,
        }))?;
    Ok(ApiResponse::ok(folder))
}

/// Query parameter for the delete guard (`?force=true`).
#[derive(Debug, Deserialize)]
pub struct ForceParams {
    #[serde(default)]
    pub force: bool,
}

/// DELETE /api/folders/{id}
///
/// A non-empty folder (child folders or associated items) is refused with
/// the counts unless `?force=true`, in which case children cascade and
/// item associations are dropped.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ForceParams>,
) -> AppResult<StatusCode> {
    if FolderRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Folder",
            id,
        }));
    }

    if !params.force {
        let stats = FolderRepo::delete_stats(&state.pool, id).await?;
        if stats.child_folders > 0 || stats.items > 0 {
            return Err(AppError::BadRequestDetail {
                message: "folder is not empty; pass force=true to delete anyway".to_string(),
                detail: json!({
                    "child_folders": stats.child_folders,
                    "items": stats.items,
                }),
            });
        }
    }

    FolderRepo::delete(&state.pool, id).await?;
    tracing::info!(folder_id = %id, force = params.force, "Folder deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Result of a batch sort-order update.
#[derive(Debug, Serialize, TS)]
pub struct BatchSortOrderResponse {
    pub updated: u64,
}

/// PATCH /api/folders/batch-sort-order
///
/// Applies all updates in one transaction so a drag-and-drop reorder
/// never half-applies.
pub async fn batch_sort_order(
    State(state): State<AppState>,
    Json(updates): Json<Vec<SortOrderUpdate>>,
) -> AppResult<ApiResponse<BatchSortOrderResponse>> {
    let updated = FolderRepo::batch_sort_order(&state.pool, &updates).await?;
    Ok(ApiResponse::ok(BatchSortOrderResponse { updated }))
}

/// POST /api/folders/reseed
///
/// Debug endpoint: recreate whichever default root folders are missing.
pub async fn reseed(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<Folder>>> {
    let created = FolderRepo::reseed_defaults(&state.pool).await?;
    tracing::info!(created = created.len(), "Default folders reseeded");
    Ok(ApiResponse::ok(created))
}
