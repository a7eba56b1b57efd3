//! Handlers for the `/snippets` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use airprompts_core::error::CoreError;
use airprompts_core::validation;
use airprompts_db::models::snippet::{CreateSnippet, Snippet, UpdateSnippet};
use airprompts_db::repositories::{clamp_limit, clamp_offset, SnippetRepo};

use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Snippet list filters (`?tag=&favorite=&folder_id=`).
#[derive(Debug, Deserialize)]
pub struct SnippetFilterParams {
    pub tag: Option<String>,
    pub favorite: Option<bool>,
    pub folder_id: Option<Uuid>,
}

/// GET /api/snippets
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<SnippetFilterParams>,
    Query(page): Query<PaginationParams>,
) -> AppResult<ApiResponse<Vec<Snippet>>> {
    let snippets = SnippetRepo::list(
        &state.pool,
        filter.tag.as_deref(),
        filter.favorite,
        filter.folder_id,
        clamp_limit(page.limit),
        clamp_offset(page.offset),
    )
    .await?;
    Ok(ApiResponse::ok(snippets))
}

/// POST /api/snippets
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateSnippet>,
) -> AppResult<(StatusCode, ApiResponse<Snippet>)> {
    validation::validate_name(&input.name)?;
    validation::validate_description(input.description.as_deref())?;
    validation::validate_content(&input.content)?;
    let tags = validation::normalize_tags(&input.tags)?;

    let snippet = SnippetRepo::create(&state.pool, &input, tags).await?;
    tracing::info!(snippet_id = %snippet.id, name = %snippet.name, "Snippet created");
    Ok(ApiResponse::created(snippet))
}

/// GET /api/snippets/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Snippet>> {
    let snippet = SnippetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Snippet",
            id,
        }))?;
    Ok(ApiResponse::ok(snippet))
}

/// PUT /api/snippets/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateSnippet>,
) -> AppResult<ApiResponse<Snippet>> {
    if let Some(name) = &input.name {
        validation::validate_name(name)?;
    }
    validation::validate_description(input.description.as_deref())?;
    if let Some(content) = &input.content {
        validation::validate_content(content)?;
    }
    let tags = match &input.tags {
        Some(raw) => Some(validation::normalize_tags(raw)?),
        None => None,
    };

    let snippet = SnippetRepo::update(&state.pool, id, &input, tags)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Snippet",
            id,
        }))?;
    Ok(ApiResponse::ok(snippet))
}

/// DELETE /api/snippets/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<StatusCode> {
    let deleted = SnippetRepo::delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Snippet",
            id,
        }))
    }
}
