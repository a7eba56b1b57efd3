//! Sequential workflow execution.
//!
//! A workflow is an ordered list of steps. Each step renders some text
//! (a template, an informational note, or a snippet inserted by tag) and
//! the rendered output of step *n* is exposed to step *n+1* through the
//! reserved `{previous_output}` variable. Execution is strictly sequential;
//! there is no branching, no concurrency, and no retry.
//!
//! The executor works on *resolved* steps: the caller (the API layer) has
//! already loaded template content and built the snippet map, so this
//! module stays free of database concerns.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::template::{self, RenderError, PREVIOUS_OUTPUT_VAR};

// ---------------------------------------------------------------------------
// Step status
// ---------------------------------------------------------------------------

/// Execution state of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Success,
    Error,
}

impl StepStatus {
    /// Return the status name as serialized over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Resolved steps
// ---------------------------------------------------------------------------

/// A workflow step with all externally-stored text already loaded.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedStep {
    /// Render a template's content with the supplied variable values.
    Template { name: String, content: String },
    /// Render an informational note (placeholders allowed).
    Info { name: String, text: String },
    /// Insert the content of the snippet carrying `tag`, verbatim.
    SnippetInsert { name: String, tag: String },
}

impl ResolvedStep {
    /// Human-readable step name for run reports.
    pub fn name(&self) -> &str {
        match self {
            Self::Template { name, .. } | Self::Info { name, .. }
            | Self::SnippetInsert { name, .. } => name,
        }
    }
}

// ---------------------------------------------------------------------------
// Execution options and run report
// ---------------------------------------------------------------------------

/// Knobs the UI exposes for a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
pub struct ExecutionOptions {
    /// When true (the default), the first failing step leaves all later
    /// steps `pending`. When false, later steps still run, each seeing the
    /// last *successful* output as `previous_output`.
    pub halt_on_error: bool,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self { halt_on_error: true }
    }
}

/// Outcome of one step within a run.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct StepResult {
    pub name: String,
    pub status: StepStatus,
    /// Rendered output; present only for successful steps.
    pub output: Option<String>,
    /// Render failure message; present only for failed steps.
    pub error: Option<String>,
}

/// Full report of a workflow run. Outputs of succeeded steps are always
/// retained, even when a later step failed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct WorkflowRun {
    pub steps: Vec<StepResult>,
    /// Output of the last successful step, if any.
    pub final_output: Option<String>,
    /// True iff every step succeeded.
    pub completed: bool,
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Execute `steps` in order, chaining outputs through `previous_output`.
///
/// `values` supplies plain variables for every step; `snippets` maps tag →
/// snippet content for both `{{tag}}` placeholders and snippet-insert
/// steps. At step 0, `previous_output` renders as the empty string.
pub fn execute(
    steps: &[ResolvedStep],
    values: &HashMap<String, String>,
    snippets: &HashMap<String, String>,
    options: ExecutionOptions,
) -> WorkflowRun {
    let mut results: Vec<StepResult> = Vec::with_capacity(steps.len());
    let mut previous = String::new();
    let mut halted = false;

    for step in steps {
        if halted {
            results.push(StepResult {
                name: step.name().to_string(),
                status: StepStatus::Pending,
                output: None,
                error: None,
            });
            continue;
        }

        let mut step_values = values.clone();
        step_values.insert(PREVIOUS_OUTPUT_VAR.to_string(), previous.clone());

        let rendered: Result<String, RenderError> = match step {
            ResolvedStep::Template { content, .. } => {
                template::render(content, &step_values, snippets)
            }
            ResolvedStep::Info { text, .. } => template::render(text, &step_values, snippets),
            ResolvedStep::SnippetInsert { tag, .. } => snippets
                .get(tag)
                .cloned()
                .ok_or_else(|| RenderError::UnknownSnippet(tag.clone())),
        };

        match rendered {
            Ok(output) => {
                previous = output.clone();
                results.push(StepResult {
                    name: step.name().to_string(),
                    status: StepStatus::Success,
                    output: Some(output),
                    error: None,
                });
            }
            Err(e) => {
                tracing::debug!(step = step.name(), error = %e, "Workflow step failed");
                results.push(StepResult {
                    name: step.name().to_string(),
                    status: StepStatus::Error,
                    output: None,
                    error: Some(e.to_string()),
                });
                if options.halt_on_error {
                    halted = true;
                }
            }
        }
    }

    let completed = results.iter().all(|r| r.status == StepStatus::Success);
    let final_output = results
        .iter()
        .rev()
        .find_map(|r| r.output.clone());

    WorkflowRun {
        steps: results,
        final_output,
        completed,
    }
}

/* --------------------------------------------------------------------------
   Tests
   -------------------------------------------------------------------------- */
