//! Repository for the `workflows` and `workflow_steps` tables.

use airprompts_core::export::ExistingItem;
use chrono::Utc;
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

use crate::models::workflow::{
    CreateWorkflow, CreateWorkflowStep, UpdateWorkflow, Workflow, WorkflowStep, WorkflowWithSteps,
};
use crate::DbPool;

use super::{folder_associations, remove_item_rows, replace_item_folders};

const COLUMNS: &str =
    "id, name, description, category, favorite, folder_id, created_at, updated_at";

const STEP_COLUMNS: &str = "id, workflow_id, template_id, step_order";

const ITEM_TYPE: &str = "workflow";

/// Provides CRUD operations for workflows and their ordered steps.
///
/// Handlers pre-check referenced template ids for a friendly 400; the FK
/// constraint inside the transaction keeps integrity under races, so a
/// workflow and its steps are never half-written.
pub struct WorkflowRepo;

impl WorkflowRepo {
    /// Insert a workflow with its steps and folder associations.
    pub async fn create(
        pool: &DbPool,
        input: &CreateWorkflow,
    ) -> Result<WorkflowWithSteps, sqlx::Error> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO workflows \
                (id, name, description, category, favorite, folder_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, COALESCE(?4, 'general'), COALESCE(?5, 0), ?6, ?7, ?7) \
             RETURNING {COLUMNS}"
        );
        let workflow = sqlx::query_as::<_, Workflow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.favorite)
            .bind(input.folder_id)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        let steps = insert_steps(&mut tx, id, &input.steps).await?;

        let associations = folder_associations(input.folder_ids.as_deref(), input.folder_id);
        replace_item_folders(&mut tx, ITEM_TYPE, id, &associations).await?;

        tx.commit().await?;
        Ok(WorkflowWithSteps { workflow, steps })
    }

    /// Find a workflow by ID, without steps.
    pub async fn find_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Workflow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workflows WHERE id = ?1");
        sqlx::query_as::<_, Workflow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a workflow joined with its ordered steps.
    pub async fn find_with_steps(
        pool: &DbPool,
        id: Uuid,
    ) -> Result<Option<WorkflowWithSteps>, sqlx::Error> {
        let Some(workflow) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let steps = Self::steps(pool, id).await?;
        Ok(Some(WorkflowWithSteps { workflow, steps }))
    }

    /// Ordered steps of one workflow.
    pub async fn steps(pool: &DbPool, workflow_id: Uuid) -> Result<Vec<WorkflowStep>, sqlx::Error> {
        let query = format!(
            "SELECT {STEP_COLUMNS} FROM workflow_steps \
             WHERE workflow_id = ?1 ORDER BY step_order ASC"
        );
        sqlx::query_as::<_, WorkflowStep>(&query)
            .bind(workflow_id)
            .fetch_all(pool)
            .await
    }

    /// List workflows with optional filters, newest-updated first.
    pub async fn list(
        pool: &DbPool,
        category: Option<&str>,
        favorite: Option<bool>,
        folder_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Workflow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workflows \
             WHERE (?1 IS NULL OR category = ?1) \
               AND (?2 IS NULL OR favorite = ?2) \
               AND (?3 IS NULL OR folder_id = ?3 OR EXISTS ( \
                    SELECT 1 FROM item_folders \
                     WHERE item_type = 'workflow' AND item_id = workflows.id AND folder_id = ?3)) \
             ORDER BY updated_at DESC \
             LIMIT ?4 OFFSET ?5"
        );
        sqlx::query_as::<_, Workflow>(&query)
            .bind(category)
            .bind(favorite)
            .bind(folder_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a workflow. `steps: Some(_)` replaces the full step list in
    /// the same transaction.
    pub async fn update(
        pool: &DbPool,
        id: Uuid,
        input: &UpdateWorkflow,
    ) -> Result<Option<WorkflowWithSteps>, sqlx::Error> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE workflows SET \
                name = COALESCE(?2, name), \
                description = COALESCE(?3, description), \
                category = COALESCE(?4, category), \
                favorite = COALESCE(?5, favorite), \
                folder_id = COALESCE(?6, folder_id), \
                updated_at = ?7 \
             WHERE id = ?1 \
             RETURNING {COLUMNS}"
        );
        let Some(workflow) = sqlx::query_as::<_, Workflow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.favorite)
            .bind(input.folder_id)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        let steps = match &input.steps {
            Some(new_steps) => {
                sqlx::query("DELETE FROM workflow_steps WHERE workflow_id = ?1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                insert_steps(&mut tx, id, new_steps).await?
            }
            None => {
                let query = format!(
                    "SELECT {STEP_COLUMNS} FROM workflow_steps \
                     WHERE workflow_id = ?1 ORDER BY step_order ASC"
                );
                sqlx::query_as::<_, WorkflowStep>(&query)
                    .bind(id)
                    .fetch_all(&mut *tx)
                    .await?
            }
        };

        if let Some(folder_ids) = &input.folder_ids {
            replace_item_folders(&mut tx, ITEM_TYPE, id, folder_ids).await?;
        }

        tx.commit().await?;
        Ok(Some(WorkflowWithSteps { workflow, steps }))
    }

    /// Delete a workflow (steps cascade) and its association/favorite rows.
    pub async fn delete(pool: &DbPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = sqlx::query("DELETE FROM workflows WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        remove_item_rows(&mut tx, ITEM_TYPE, id).await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Template ids among `ids` that do not exist. Used by handlers to
    /// reject a workflow before any row is written.
    pub async fn missing_template_ids(
        pool: &DbPool,
        ids: &[Uuid],
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let mut missing = Vec::new();
        for id in ids {
            let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM templates WHERE id = ?1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
            if found.is_none() {
                missing.push(*id);
            }
        }
        Ok(missing)
    }

    /// `(id, name)` view of every workflow, for import duplicate checks.
    pub async fn existing_items(pool: &DbPool) -> Result<Vec<ExistingItem>, sqlx::Error> {
        let rows: Vec<(Uuid, String)> = sqlx::query_as("SELECT id, name FROM workflows")
            .fetch_all(pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| ExistingItem { id, name })
            .collect())
    }
}

/// Insert `steps` for `workflow_id`, defaulting `step_order` to list
/// position, and return the created rows in order.
async fn insert_steps(
    tx: &mut Transaction<'_, Sqlite>,
    workflow_id: Uuid,
    steps: &[CreateWorkflowStep],
) -> Result<Vec<WorkflowStep>, sqlx::Error> {
    let mut created = Vec::with_capacity(steps.len());
    for (i, step) in steps.iter().enumerate() {
        let query = format!(
            "INSERT INTO workflow_steps (id, workflow_id, template_id, step_order) \
             VALUES (?1, ?2, ?3, ?4) \
             RETURNING {STEP_COLUMNS}"
        );
        let row = sqlx::query_as::<_, WorkflowStep>(&query)
            .bind(Uuid::new_v4())
            .bind(workflow_id)
            .bind(step.template_id)
            .bind(step.step_order.unwrap_or(i as i64))
            .fetch_one(&mut **tx)
            .await?;
        created.push(row);
    }
    Ok(created)
}
