//! Handlers for export, import, and legacy localStorage-dump migration.
//!
//! Import bodies are taken as raw bytes and parsed by hand so a malformed
//! upload gets a precise `INVALID_JSON` error instead of the generic
//! extractor rejection (these are user-supplied files, not SPA payloads).

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use airprompts_core::error::CoreError;
use airprompts_core::export::{
    self, DuplicateStrategy, ExportBundle, ImportIssue, ImportOptions, ImportPreview,
};
use airprompts_db::repositories::{ImportSummary, TransferRepo};

use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;
use crate::state::AppState;

fn parse_json<T: serde::de::DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::InvalidJson(e.to_string()))
}

/// GET /api/export
///
/// Snapshots the whole library into a downloadable bundle. The suggested
/// filename carries the export date.
pub async fn export(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let bundle = TransferRepo::export_bundle(&state.pool).await?;
    let filename = export::export_filename(bundle.exported_at);
    tracing::info!(
        templates = bundle.templates.len(),
        workflows = bundle.workflows.len(),
        snippets = bundle.snippets.len(),
        folders = bundle.folders.len(),
        "Library exported"
    );
    Ok((
        [(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )],
        ApiResponse::ok(bundle),
    ))
}

/// POST /api/import/preview
///
/// Dry run: classifies every bundle item as new, duplicate, or invalid.
/// Writes nothing.
pub async fn import_preview(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<ApiResponse<ImportPreview>> {
    let bundle: ExportBundle = parse_json(&body)?;
    let existing = TransferRepo::existing_library(&state.pool).await?;
    let preview = export::preview(&bundle, &existing);
    Ok(ApiResponse::ok(preview))
}

/// Request body for an import.
#[derive(Debug, Deserialize, TS)]
pub struct ImportRequest {
    pub bundle: ExportBundle,
    pub strategy: DuplicateStrategy,
    #[serde(default)]
    pub skip_invalid: bool,
}

/// Outcome of an applied import.
#[derive(Debug, Serialize, TS)]
pub struct ImportReport {
    pub created: usize,
    pub replaced: usize,
    pub skipped: Vec<ImportIssue>,
}

/// POST /api/import
pub async fn import(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<ApiResponse<ImportReport>> {
    let request: ImportRequest = parse_json(&body)?;
    let existing = TransferRepo::existing_library(&state.pool).await?;
    let plan = export::plan(
        &request.bundle,
        &existing,
        ImportOptions {
            strategy: request.strategy,
            skip_invalid: request.skip_invalid,
        },
    )?;
    let summary = TransferRepo::apply_plan(&state.pool, &plan).await?;
    tracing::info!(
        created = summary.created,
        replaced = summary.replaced,
        skipped = plan.skipped.len(),
        "Import applied"
    );
    Ok(ApiResponse::ok(report(summary, plan.skipped)))
}

/// Legacy import query parameters.
#[derive(Debug, Deserialize)]
pub struct LegacyImportParams {
    /// Duplicate strategy; legacy migrations default to merge so nothing
    /// already in the library is overwritten.
    pub strategy: Option<DuplicateStrategy>,
}

/// POST /api/import/legacy
///
/// Accepts a raw localStorage dump (the object the old SPA kept under its
/// `airprompts_*` keys, double-encoded values included) and migrates it.
/// Items that cannot be salvaged are reported, not fatal.
pub async fn import_legacy(
    State(state): State<AppState>,
    Query(params): Query<LegacyImportParams>,
    body: Bytes,
) -> AppResult<ApiResponse<ImportReport>> {
    let enabled = state
        .flags
        .evaluate("ENABLE_LEGACY_IMPORT", None)
        .is_some_and(|e| e.enabled);
    if !enabled {
        return Err(AppError::Core(CoreError::Validation(
            "legacy import is disabled".to_string(),
        )));
    }

    let dump: serde_json::Value = parse_json(&body)?;
    let (bundle, mut issues) = export::parse_legacy_dump(&dump)?;

    let existing = TransferRepo::existing_library(&state.pool).await?;
    let plan = export::plan(
        &bundle,
        &existing,
        ImportOptions {
            strategy: params.strategy.unwrap_or(DuplicateStrategy::Merge),
            skip_invalid: true,
        },
    )?;
    let summary = TransferRepo::apply_plan(&state.pool, &plan).await?;
    tracing::info!(
        created = summary.created,
        replaced = summary.replaced,
        issues = issues.len() + plan.skipped.len(),
        "Legacy dump migrated"
    );

    issues.extend(plan.skipped);
    Ok(ApiResponse::ok(report(summary, issues)))
}

fn report(summary: ImportSummary, skipped: Vec<ImportIssue>) -> ImportReport {
    ImportReport {
        created: summary.created,
        replaced: summary.replaced,
        skipped,
    }
}
