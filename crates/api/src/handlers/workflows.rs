//! Handlers for the `/workflows` resource.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use ts_rs::TS;
use uuid::Uuid;

use airprompts_core::error::CoreError;
use airprompts_core::validation;
use airprompts_core::workflow::{self, ExecutionOptions, ResolvedStep, WorkflowRun};
use airprompts_db::models::workflow::{
    CreateWorkflow, UpdateWorkflow, Workflow, WorkflowWithSteps,
};
use airprompts_db::repositories::{
    clamp_limit, clamp_offset, SnippetRepo, TemplateRepo, WorkflowRepo,
};

use crate::error::{AppError, AppResult};
use crate::query::{ItemFilterParams, PaginationParams};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Reject a step list whose templates do not all exist. Checked before any
/// row is written so a bad create/update leaves nothing behind.
async fn check_step_templates(
    state: &AppState,
    steps: &[airprompts_db::models::workflow::CreateWorkflowStep],
) -> AppResult<()> {
    let ids: Vec<Uuid> = steps.iter().map(|s| s.template_id).collect();
    let missing = WorkflowRepo::missing_template_ids(&state.pool, &ids).await?;
    if !missing.is_empty() {
        let list = missing
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        return Err(AppError::Core(CoreError::Validation(format!(
            "workflow references missing templates: {list}"
        ))));
    }
    Ok(())
}

/// GET /api/workflows
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ItemFilterParams>,
    Query(page): Query<PaginationParams>,
) -> AppResult<ApiResponse<Vec<Workflow>>> {
    let workflows = WorkflowRepo::list(
        &state.pool,
        filter.category.as_deref(),
        filter.favorite,
        filter.folder_id,
        clamp_limit(page.limit),
        clamp_offset(page.offset),
    )
    .await?;
    Ok(ApiResponse::ok(workflows))
}

/// POST /api/workflows
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateWorkflow>,
) -> AppResult<(StatusCode, ApiResponse<WorkflowWithSteps>)> {
    validation::validate_name(&input.name)?;
    validation::validate_description(input.description.as_deref())?;
    check_step_templates(&state, &input.steps).await?;

    let workflow = WorkflowRepo::create(&state.pool, &input).await?;
    tracing::info!(
        workflow_id = %workflow.workflow.id,
        steps = workflow.steps.len(),
        "Workflow created"
    );
    Ok(ApiResponse::created(workflow))
}

/// GET /api/workflows/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<WorkflowWithSteps>> {
    let workflow = WorkflowRepo::find_with_steps(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Workflow",
            id,
        }))?;
    Ok(ApiResponse::ok(workflow))
}

/// PUT /api/workflows/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateWorkflow>,
) -> AppResult<ApiResponse<WorkflowWithSteps>> {
    if let Some(name) = &input.name {
        validation::validate_name(name)?;
    }
    validation::validate_description(input.description.as_deref())?;
    if let Some(steps) = &input.steps {
        check_step_templates(&state, steps).await?;
    }

    let workflow = WorkflowRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Workflow",
            id,
        }))?;
    Ok(ApiResponse::ok(workflow))
}

/// DELETE /api/workflows/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<StatusCode> {
    let deleted = WorkflowRepo::delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Workflow",
            id,
        }))
    }
}

/// Request body for a workflow run.
#[derive(Debug, Deserialize, TS)]
pub struct ExecuteRequest {
    /// Values for `{variable}` placeholders, shared by every step.
    #[serde(default)]
    pub values: HashMap<String, String>,
    /// Overrides the halt-on-error default for this run.
    pub halt_on_error: Option<bool>,
}

/// POST /api/workflows/{id}/execute
///
/// Runs the steps in order, chaining each step's output into the next
/// step's `previous_output`. The halt-on-error default comes from the
/// `WORKFLOW_CONTINUE_ON_ERROR` flag unless the request overrides it.
pub async fn execute(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ExecuteRequest>,
) -> AppResult<ApiResponse<WorkflowRun>> {
    let workflow = WorkflowRepo::find_with_steps(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Workflow",
            id,
        }))?;

    let mut resolved = Vec::with_capacity(workflow.steps.len());
    for step in &workflow.steps {
        let template = TemplateRepo::find_by_id(&state.pool, step.template_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Template",
                id: step.template_id,
            }))?;
        resolved.push(ResolvedStep::Template {
            name: template.name,
            content: template.content,
        });
    }

    let snippets = SnippetRepo::tag_map(&state.pool).await?;

    let halt_on_error = match input.halt_on_error {
        Some(halt) => halt,
        None => !state
            .flags
            .evaluate("WORKFLOW_CONTINUE_ON_ERROR", None)
            .is_some_and(|e| e.enabled),
    };

    let run = workflow::execute(
        &resolved,
        &input.values,
        &snippets,
        ExecutionOptions { halt_on_error },
    );
    tracing::info!(
        workflow_id = %id,
        steps = run.steps.len(),
        completed = run.completed,
        "Workflow executed"
    );
    Ok(ApiResponse::ok(run))
}
