use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use uuid::Uuid;

/// An ordered sequence of template steps executed with output chaining.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Workflow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub favorite: bool,
    pub folder_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One step row; unique per `(workflow_id, step_order)` and cascade-deleted
/// with its workflow.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct WorkflowStep {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub template_id: Uuid,
    pub step_order: i64,
}

/// A workflow joined with its ordered steps.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct WorkflowWithSteps {
    #[serde(flatten)]
    #[ts(flatten)]
    pub workflow: Workflow,
    pub steps: Vec<WorkflowStep>,
}

impl std::ops::Deref for WorkflowWithSteps {
    type Target = Workflow;
    fn deref(&self) -> &Self::Target {
        &self.workflow
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateWorkflowStep {
    pub template_id: Uuid,
    /// Defaults to the step's position in the submitted list.
    pub step_order: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateWorkflow {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub favorite: Option<bool>,
    pub folder_id: Option<Uuid>,
    pub folder_ids: Option<Vec<Uuid>>,
    #[serde(default)]
    pub steps: Vec<CreateWorkflowStep>,
}

/// Partial update: `None` keeps the stored value; `steps: Some(_)` replaces
/// the full step list.
#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateWorkflow {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub favorite: Option<bool>,
    pub folder_id: Option<Uuid>,
    pub folder_ids: Option<Vec<Uuid>>,
    pub steps: Option<Vec<CreateWorkflowStep>>,
}
