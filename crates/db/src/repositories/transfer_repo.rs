//! Export-bundle reads and import-plan application.
//!
//! Planning lives in `airprompts_core::export` (pure); this repo supplies
//! the two database ends: snapshotting the library into a bundle and
//! applying a finished plan inside a single transaction, so an import is
//! all-or-nothing at the database level.

use airprompts_core::export::{
    ExistingLibrary, ExportBundle, FolderExport, ImportPlan, SnippetExport, TemplateExport,
    WorkflowExport, WriteAction, EXPORT_VERSION,
};
use airprompts_core::template::extract_variables;
use airprompts_core::validation::{
    normalize_tags, ITEM_TYPE_SNIPPET, ITEM_TYPE_TEMPLATE, ITEM_TYPE_WORKFLOW,
};
use chrono::Utc;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{Sqlite, Transaction};
use ts_rs::TS;
use uuid::Uuid;

use crate::DbPool;

use super::{
    folder_associations, replace_item_folders, FolderRepo, SnippetRepo, TemplateRepo, WorkflowRepo,
};

/// Row counts from an applied import plan.
#[derive(Debug, Clone, Copy, Default, Serialize, TS)]
pub struct ImportSummary {
    pub created: usize,
    pub replaced: usize,
}

pub struct TransferRepo;

impl TransferRepo {
    /// Snapshot the whole library into a portable bundle.
    pub async fn export_bundle(pool: &DbPool) -> Result<ExportBundle, sqlx::Error> {
        let templates = TemplateRepo::list(pool, None, None, None, i64::MAX, 0)
            .await?
            .into_iter()
            .map(|t| TemplateExport {
                id: t.id,
                name: t.name,
                description: t.description,
                content: t.content,
                category: t.category,
                favorite: t.favorite,
                folder_id: t.folder_id,
            })
            .collect();

        let mut workflows = Vec::new();
        for w in WorkflowRepo::list(pool, None, None, None, i64::MAX, 0).await? {
            let steps = WorkflowRepo::steps(pool, w.id)
                .await?
                .into_iter()
                .map(|s| airprompts_core::export::WorkflowStepExport {
                    template_id: s.template_id,
                    step_order: s.step_order,
                })
                .collect();
            workflows.push(WorkflowExport {
                id: w.id,
                name: w.name,
                description: w.description,
                category: w.category,
                favorite: w.favorite,
                folder_id: w.folder_id,
                steps,
            });
        }

        let snippets = SnippetRepo::list(pool, None, None, None, i64::MAX, 0)
            .await?
            .into_iter()
            .map(|s| SnippetExport {
                id: s.id,
                name: s.name,
                description: s.description,
                content: s.content,
                tags: s.tags.0,
                favorite: s.favorite,
                folder_id: s.folder_id,
            })
            .collect();

        let folders = FolderRepo::list_with_counts(pool)
            .await?
            .into_iter()
            .map(|f| FolderExport {
                id: f.folder.id,
                name: f.folder.name,
                parent_id: f.folder.parent_id,
                sort_order: f.folder.sort_order,
            })
            .collect();

        Ok(ExportBundle {
            version: EXPORT_VERSION.to_string(),
            exported_at: Utc::now(),
            templates,
            workflows,
            snippets,
            folders,
        })
    }

    /// `(id, name)` snapshot of the library, for planning.
    pub async fn existing_library(pool: &DbPool) -> Result<ExistingLibrary, sqlx::Error> {
        Ok(ExistingLibrary {
            templates: TemplateRepo::existing_items(pool).await?,
            workflows: WorkflowRepo::existing_items(pool).await?,
            snippets: SnippetRepo::existing_items(pool).await?,
            folders: FolderRepo::existing_items(pool).await?,
        })
    }

    /// Apply a finished plan in one transaction.
    pub async fn apply_plan(pool: &DbPool, plan: &ImportPlan) -> Result<ImportSummary, sqlx::Error> {
        let mut summary = ImportSummary::default();
        let mut tx = pool.begin().await?;

        for f in &plan.folders {
            write_folder(&mut tx, f.action, &f.row).await?;
            count(&mut summary, f.action);
        }
        for t in &plan.templates {
            write_template(&mut tx, t.action, &t.row).await?;
            count(&mut summary, t.action);
        }
        for w in &plan.workflows {
            write_workflow(&mut tx, w.action, &w.row).await?;
            count(&mut summary, w.action);
        }
        for s in &plan.snippets {
            write_snippet(&mut tx, s.action, &s.row).await?;
            count(&mut summary, s.action);
        }

        tx.commit().await?;
        Ok(summary)
    }
}

fn count(summary: &mut ImportSummary, action: WriteAction) {
    match action {
        WriteAction::Create => summary.created += 1,
        WriteAction::Replace => summary.replaced += 1,
    }
}

async fn write_folder(
    tx: &mut Transaction<'_, Sqlite>,
    action: WriteAction,
    row: &FolderExport,
) -> Result<(), sqlx::Error> {
    let now = Utc::now();
    match action {
        WriteAction::Create => {
            sqlx::query(
                "INSERT INTO folders (id, name, parent_id, sort_order, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            )
            .bind(row.id)
            .bind(&row.name)
            .bind(row.parent_id)
            .bind(row.sort_order)
            .bind(now)
            .execute(&mut **tx)
            .await?;
        }
        WriteAction::Replace => {
            sqlx::query(
                "UPDATE folders SET name = ?2, parent_id = ?3, sort_order = ?4, updated_at = ?5 \
                 WHERE id = ?1",
            )
            .bind(row.id)
            .bind(&row.name)
            .bind(row.parent_id)
            .bind(row.sort_order)
            .bind(now)
            .execute(&mut **tx)
            .await?;
        }
    }
    Ok(())
}

// Each entity write also mirrors the bundle's folder_id into the
// item_folders junction, matching what the entity repos do on create.

async fn write_template(
    tx: &mut Transaction<'_, Sqlite>,
    action: WriteAction,
    row: &TemplateExport,
) -> Result<(), sqlx::Error> {
    let now = Utc::now();
    let variables = Json(extract_variables(&row.content));
    match action {
        WriteAction::Create => {
            sqlx::query(
                "INSERT INTO templates \
                    (id, name, description, content, category, variables, favorite, folder_id, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            )
            .bind(row.id)
            .bind(&row.name)
            .bind(&row.description)
            .bind(&row.content)
            .bind(&row.category)
            .bind(&variables)
            .bind(row.favorite)
            .bind(row.folder_id)
            .bind(now)
            .execute(&mut **tx)
            .await?;
        }
        WriteAction::Replace => {
            sqlx::query(
                "UPDATE templates SET name = ?2, description = ?3, content = ?4, category = ?5, \
                    variables = ?6, favorite = ?7, folder_id = ?8, updated_at = ?9 \
                 WHERE id = ?1",
            )
            .bind(row.id)
            .bind(&row.name)
            .bind(&row.description)
            .bind(&row.content)
            .bind(&row.category)
            .bind(&variables)
            .bind(row.favorite)
            .bind(row.folder_id)
            .bind(now)
            .execute(&mut **tx)
            .await?;
        }
    }
    replace_item_folders(
        tx,
        ITEM_TYPE_TEMPLATE,
        row.id,
        &folder_associations(None, row.folder_id),
    )
    .await?;
    Ok(())
}

async fn write_workflow(
    tx: &mut Transaction<'_, Sqlite>,
    action: WriteAction,
    row: &WorkflowExport,
) -> Result<(), sqlx::Error> {
    let now = Utc::now();
    match action {
        WriteAction::Create => {
            sqlx::query(
                "INSERT INTO workflows \
                    (id, name, description, category, favorite, folder_id, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            )
            .bind(row.id)
            .bind(&row.name)
            .bind(&row.description)
            .bind(&row.category)
            .bind(row.favorite)
            .bind(row.folder_id)
            .bind(now)
            .execute(&mut **tx)
            .await?;
        }
        WriteAction::Replace => {
            sqlx::query(
                "UPDATE workflows SET name = ?2, description = ?3, category = ?4, \
                    favorite = ?5, folder_id = ?6, updated_at = ?7 \
                 WHERE id = ?1",
            )
            .bind(row.id)
            .bind(&row.name)
            .bind(&row.description)
            .bind(&row.category)
            .bind(row.favorite)
            .bind(row.folder_id)
            .bind(now)
            .execute(&mut **tx)
            .await?;
            sqlx::query("DELETE FROM workflow_steps WHERE workflow_id = ?1")
                .bind(row.id)
                .execute(&mut **tx)
                .await?;
        }
    }
    for step in &row.steps {
        sqlx::query(
            "INSERT INTO workflow_steps (id, workflow_id, template_id, step_order) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(Uuid::new_v4())
        .bind(row.id)
        .bind(step.template_id)
        .bind(step.step_order)
        .execute(&mut **tx)
        .await?;
    }
    replace_item_folders(
        tx,
        ITEM_TYPE_WORKFLOW,
        row.id,
        &folder_associations(None, row.folder_id),
    )
    .await?;
    Ok(())
}

async fn write_snippet(
    tx: &mut Transaction<'_, Sqlite>,
    action: WriteAction,
    row: &SnippetExport,
) -> Result<(), sqlx::Error> {
    let now = Utc::now();
    // Oversized tag sets are trimmed to nothing rather than failing the
    // whole import; the issue surfaces in the snippet, not the run.
    let tags = Json(normalize_tags(&row.tags).unwrap_or_default());
    match action {
        WriteAction::Create => {
            sqlx::query(
                "INSERT INTO snippets \
                    (id, name, description, content, tags, favorite, folder_id, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            )
            .bind(row.id)
            .bind(&row.name)
            .bind(&row.description)
            .bind(&row.content)
            .bind(&tags)
            .bind(row.favorite)
            .bind(row.folder_id)
            .bind(now)
            .execute(&mut **tx)
            .await?;
        }
        WriteAction::Replace => {
            sqlx::query(
                "UPDATE snippets SET name = ?2, description = ?3, content = ?4, tags = ?5, \
                    favorite = ?6, folder_id = ?7, updated_at = ?8 \
                 WHERE id = ?1",
            )
            .bind(row.id)
            .bind(&row.name)
            .bind(&row.description)
            .bind(&row.content)
            .bind(&tags)
            .bind(row.favorite)
            .bind(row.folder_id)
            .bind(now)
            .execute(&mut **tx)
            .await?;
        }
    }
    replace_item_folders(
        tx,
        ITEM_TYPE_SNIPPET,
        row.id,
        &folder_associations(None, row.folder_id),
    )
    .await?;
    Ok(())
}
