//! Handlers for the `/templates` resource.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use airprompts_core::error::CoreError;
use airprompts_core::template;
use airprompts_core::validation;
use airprompts_db::models::template::{CreateTemplate, Template, UpdateTemplate};
use airprompts_db::repositories::{clamp_limit, clamp_offset, SnippetRepo, TemplateRepo};

use crate::error::{AppError, AppResult};
use crate::query::{ItemFilterParams, PaginationParams};
use crate::response::ApiResponse;
use crate::state::AppState;

fn validate_create(input: &CreateTemplate) -> Result<(), CoreError> {
    validation::validate_name(&input.name)?;
    validation::validate_description(input.description.as_deref())?;
    validation::validate_content(&input.content)?;
    Ok(())
}

fn validate_update(input: &UpdateTemplate) -> Result<(), CoreError> {
    if let Some(name) = &input.name {
        validation::validate_name(name)?;
    }
    validation::validate_description(input.description.as_deref())?;
    if let Some(content) = &input.content {
        validation::validate_content(content)?;
    }
    Ok(())
}

/// GET /api/templates
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ItemFilterParams>,
    Query(page): Query<PaginationParams>,
) -> AppResult<ApiResponse<Vec<Template>>> {
    let templates = TemplateRepo::list(
        &state.pool,
        filter.category.as_deref(),
        filter.favorite,
        filter.folder_id,
        clamp_limit(page.limit),
        clamp_offset(page.offset),
    )
    .await?;
    Ok(ApiResponse::ok(templates))
}

/// POST /api/templates
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateTemplate>,
) -> AppResult<(StatusCode, ApiResponse<Template>)> {
    validate_create(&input)?;
    let template = TemplateRepo::create(&state.pool, &input).await?;
    tracing::info!(template_id = %template.id, name = %template.name, "Template created");
    Ok(ApiResponse::created(template))
}

/// GET /api/templates/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Template>> {
    let template = TemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Template",
            id,
        }))?;
    Ok(ApiResponse::ok(template))
}

/// PUT /api/templates/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTemplate>,
) -> AppResult<ApiResponse<Template>> {
    validate_update(&input)?;
    let template = TemplateRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Template",
            id,
        }))?;
    Ok(ApiResponse::ok(template))
}

/// DELETE /api/templates/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<StatusCode> {
    let deleted = TemplateRepo::delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Template",
            id,
        }))
    }
}

/// Request body for a one-off render.
#[derive(Debug, Deserialize, TS)]
pub struct RenderRequest {
    /// Values for `{variable}` placeholders.
    #[serde(default)]
    pub values: HashMap<String, String>,
}

/// Rendered output of a single template.
#[derive(Debug, Serialize, TS)]
pub struct RenderResponse {
    pub output: String,
}

/// POST /api/templates/{id}/render
///
/// Renders the stored content with the supplied variable values; snippet
/// tags resolve against the current snippet library.
pub async fn render(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<RenderRequest>,
) -> AppResult<ApiResponse<RenderResponse>> {
    let template = TemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Template",
            id,
        }))?;

    let snippets = SnippetRepo::tag_map(&state.pool).await?;
    let output = template::render(&template.content, &input.values, &snippets)
        .map_err(|e| CoreError::Validation(e.to_string()))?;

    Ok(ApiResponse::ok(RenderResponse { output }))
}
