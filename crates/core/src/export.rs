//! Import/export bundles, duplicate handling, and legacy-dump migration.
//!
//! The export bundle is the portable JSON snapshot the SPA downloads as
//! `airprompts-export-YYYY-MM-DD.json` and re-uploads through the import
//! flow. Import runs in two phases:
//!
//! 1. **preview**: classify every bundle item as new, duplicate (name
//!    collision with an existing entity), or invalid, without writing
//!    anything;
//! 2. **plan**: given a duplicate strategy, produce ready-to-apply rows
//!    with final IDs and all cross-references (workflow steps, folder
//!    parents, folder pointers) remapped. The database layer applies a plan
//!    inside a single transaction.
//!
//! Legacy migration accepts a raw dump of the browser's `airprompts_*`
//! localStorage keys and converts it into a regular bundle, remapping the
//! old numeric/string ids to fresh UUIDs and accumulating per-item issues
//! instead of aborting the run.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};
use crate::validation::{ITEM_TYPE_SNIPPET, ITEM_TYPE_TEMPLATE, ITEM_TYPE_WORKFLOW};

// ---------------------------------------------------------------------------
// Bundle shapes
// ---------------------------------------------------------------------------

/// Bundle format version. Bump when the shape changes incompatibly.
pub const EXPORT_VERSION: &str = "1";

/// Suffix appended to a duplicate's name under the merge strategy.
pub const IMPORTED_NAME_SUFFIX: &str = " (imported)";

/// Suggested download filename for an export taken at `at`.
pub fn export_filename(at: Timestamp) -> String {
    format!("airprompts-export-{}.json", at.format("%Y-%m-%d"))
}

/// A portable snapshot of the whole library.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ExportBundle {
    pub version: String,
    pub exported_at: Timestamp,
    pub templates: Vec<TemplateExport>,
    pub workflows: Vec<WorkflowExport>,
    pub snippets: Vec<SnippetExport>,
    pub folders: Vec<FolderExport>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct TemplateExport {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub content: String,
    pub category: String,
    pub favorite: bool,
    pub folder_id: Option<EntityId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct WorkflowStepExport {
    pub template_id: EntityId,
    pub step_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct WorkflowExport {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub favorite: bool,
    pub folder_id: Option<EntityId>,
    pub steps: Vec<WorkflowStepExport>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SnippetExport {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub content: String,
    pub tags: Vec<String>,
    pub favorite: bool,
    pub folder_id: Option<EntityId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct FolderExport {
    pub id: EntityId,
    pub name: String,
    pub parent_id: Option<EntityId>,
    pub sort_order: i64,
}

// ---------------------------------------------------------------------------
// Existing-library view
// ---------------------------------------------------------------------------

/// Minimal view of an entity already in the database, for duplicate and
/// reference checks. The API layer builds this from the repositories.
#[derive(Debug, Clone)]
pub struct ExistingItem {
    pub id: EntityId,
    pub name: String,
}

/// Snapshot of what the library already contains.
#[derive(Debug, Clone, Default)]
pub struct ExistingLibrary {
    pub templates: Vec<ExistingItem>,
    pub workflows: Vec<ExistingItem>,
    pub snippets: Vec<ExistingItem>,
    pub folders: Vec<ExistingItem>,
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

/// Classification of a single bundle item during preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
pub enum ItemDisposition {
    New,
    Duplicate,
    Invalid,
}

/// One previewed bundle item.
#[derive(Debug, Clone, Serialize, TS)]
pub struct PreviewItem {
    pub item_type: String,
    pub name: String,
    pub disposition: ItemDisposition,
    /// Set for invalid items: what is wrong with them.
    pub message: Option<String>,
}

/// Result of a dry-run over a bundle.
#[derive(Debug, Clone, Serialize, TS)]
pub struct ImportPreview {
    pub items: Vec<PreviewItem>,
    pub new_count: usize,
    pub duplicate_count: usize,
    pub invalid_count: usize,
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// How duplicates (name collisions) are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateStrategy {
    /// Import the duplicate under `"<name> (imported)"`, keeping both.
    Merge,
    /// Overwrite the existing entity of the same name in place.
    Replace,
    /// Drop the duplicate from the import.
    Skip,
}

/// Options controlling plan construction.
#[derive(Debug, Clone, Copy, Deserialize, TS)]
pub struct ImportOptions {
    pub strategy: DuplicateStrategy,
    /// When true, workflows referencing missing templates are skipped with
    /// an issue; when false, such a workflow fails the whole import.
    #[serde(default)]
    pub skip_invalid: bool,
}

/// Write mode for one planned row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
pub enum WriteAction {
    /// Insert a fresh row (possibly under a renamed name).
    Create,
    /// Overwrite the existing row carrying this id.
    Replace,
}

/// A bundle item skipped during planning, with the reason.
#[derive(Debug, Clone, Serialize, TS)]
pub struct ImportIssue {
    pub item_type: String,
    pub name: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct PlannedFolder {
    pub action: WriteAction,
    pub row: FolderExport,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct PlannedTemplate {
    pub action: WriteAction,
    pub row: TemplateExport,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct PlannedWorkflow {
    pub action: WriteAction,
    pub row: WorkflowExport,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct PlannedSnippet {
    pub action: WriteAction,
    pub row: SnippetExport,
}

/// Ready-to-apply import plan. All ids are final: fresh UUIDs for created
/// rows, existing ids for replacements, and every cross-reference remapped.
/// Folders come first in dependency order (parents before children).
#[derive(Debug, Clone, Serialize, TS)]
pub struct ImportPlan {
    pub folders: Vec<PlannedFolder>,
    pub templates: Vec<PlannedTemplate>,
    pub workflows: Vec<PlannedWorkflow>,
    pub snippets: Vec<PlannedSnippet>,
    pub skipped: Vec<ImportIssue>,
}

impl ImportPlan {
    /// Total rows the plan will write.
    pub fn write_count(&self) -> usize {
        self.folders.len() + self.templates.len() + self.workflows.len() + self.snippets.len()
    }
}

// ---------------------------------------------------------------------------
// Bundle validation helpers
// ---------------------------------------------------------------------------

fn validate_bundle_item(name: &str, content: Option<&str>) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("missing name".to_string());
    }
    if let Some(c) = content {
        if c.is_empty() {
            return Err("missing content".to_string());
        }
    }
    Ok(())
}

/// Check a workflow's step references against bundle + existing templates.
fn missing_step_reference(
    wf: &WorkflowExport,
    bundle_template_ids: &HashSet<EntityId>,
    existing_template_ids: &HashSet<EntityId>,
) -> Option<EntityId> {
    wf.steps
        .iter()
        .map(|s| s.template_id)
        .find(|id| !bundle_template_ids.contains(id) && !existing_template_ids.contains(id))
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

/// Dry-run classification of every bundle item. Never writes.
pub fn preview(bundle: &ExportBundle, existing: &ExistingLibrary) -> ImportPreview {
    let bundle_template_ids: HashSet<EntityId> = bundle.templates.iter().map(|t| t.id).collect();
    let existing_template_ids: HashSet<EntityId> =
        existing.templates.iter().map(|t| t.id).collect();

    let mut items = Vec::new();

    let classify = |name: &str,
                    content: Option<&str>,
                    existing_names: &HashSet<&str>,
                    extra_invalid: Option<String>| {
        if let Err(msg) = validate_bundle_item(name, content) {
            (ItemDisposition::Invalid, Some(msg))
        } else if let Some(msg) = extra_invalid {
            (ItemDisposition::Invalid, Some(msg))
        } else if existing_names.contains(name) {
            (ItemDisposition::Duplicate, None)
        } else {
            (ItemDisposition::New, None)
        }
    };

    let template_names: HashSet<&str> = existing.templates.iter().map(|t| t.name.as_str()).collect();
    for t in &bundle.templates {
        let (disposition, message) = classify(&t.name, Some(&t.content), &template_names, None);
        items.push(PreviewItem {
            item_type: ITEM_TYPE_TEMPLATE.to_string(),
            name: t.name.clone(),
            disposition,
            message,
        });
    }

    let workflow_names: HashSet<&str> = existing.workflows.iter().map(|w| w.name.as_str()).collect();
    for w in &bundle.workflows {
        let missing = missing_step_reference(w, &bundle_template_ids, &existing_template_ids)
            .map(|id| format!("step references missing template {id}"));
        let (disposition, message) = classify(&w.name, None, &workflow_names, missing);
        items.push(PreviewItem {
            item_type: ITEM_TYPE_WORKFLOW.to_string(),
            name: w.name.clone(),
            disposition,
            message,
        });
    }

    let snippet_names: HashSet<&str> = existing.snippets.iter().map(|s| s.name.as_str()).collect();
    for s in &bundle.snippets {
        let (disposition, message) = classify(&s.name, Some(&s.content), &snippet_names, None);
        items.push(PreviewItem {
            item_type: ITEM_TYPE_SNIPPET.to_string(),
            name: s.name.clone(),
            disposition,
            message,
        });
    }

    let new_count = items
        .iter()
        .filter(|i| i.disposition == ItemDisposition::New)
        .count();
    let duplicate_count = items
        .iter()
        .filter(|i| i.disposition == ItemDisposition::Duplicate)
        .count();
    let invalid_count = items
        .iter()
        .filter(|i| i.disposition == ItemDisposition::Invalid)
        .count();

    ImportPreview {
        items,
        new_count,
        duplicate_count,
        invalid_count,
    }
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Build a ready-to-apply plan from a bundle.
///
/// Fails with `CoreError::Validation` when a workflow references a missing
/// template and `skip_invalid` is off. Under `Merge`, duplicates never
/// silently overwrite: they import under `"<name> (imported)"`.
pub fn plan(
    bundle: &ExportBundle,
    existing: &ExistingLibrary,
    options: ImportOptions,
) -> Result<ImportPlan, CoreError> {
    let mut skipped: Vec<ImportIssue> = Vec::new();

    // Every bundle id gets a final id up front: fresh UUID by default,
    // replaced below with the existing id when the strategy says Replace.
    let mut id_map: HashMap<EntityId, EntityId> = HashMap::new();
    for id in bundle
        .folders
        .iter()
        .map(|f| f.id)
        .chain(bundle.templates.iter().map(|t| t.id))
        .chain(bundle.workflows.iter().map(|w| w.id))
        .chain(bundle.snippets.iter().map(|s| s.id))
    {
        id_map.insert(id, Uuid::new_v4());
    }

    let existing_by_name = |items: &[ExistingItem]| -> HashMap<String, EntityId> {
        items.iter().map(|i| (i.name.clone(), i.id)).collect()
    };
    let existing_templates = existing_by_name(&existing.templates);
    let existing_workflows = existing_by_name(&existing.workflows);
    let existing_snippets = existing_by_name(&existing.snippets);
    let existing_folders = existing_by_name(&existing.folders);

    // Decide the action for one named item; updates the id map for replaces.
    // Returns None when the item must be dropped from the plan.
    let decide = |item_type: &str,
                      bundle_id: EntityId,
                      name: &str,
                      existing: &HashMap<String, EntityId>,
                      id_map: &mut HashMap<EntityId, EntityId>,
                      skipped: &mut Vec<ImportIssue>|
     -> Option<(WriteAction, String)> {
        match existing.get(name) {
            None => Some((WriteAction::Create, name.to_string())),
            Some(&existing_id) => match options.strategy {
                DuplicateStrategy::Merge => Some((
                    WriteAction::Create,
                    format!("{name}{IMPORTED_NAME_SUFFIX}"),
                )),
                DuplicateStrategy::Replace => {
                    id_map.insert(bundle_id, existing_id);
                    Some((WriteAction::Replace, name.to_string()))
                }
                DuplicateStrategy::Skip => {
                    // Things referencing the duplicate resolve to the row
                    // already in the library.
                    id_map.insert(bundle_id, existing_id);
                    skipped.push(ImportIssue {
                        item_type: item_type.to_string(),
                        name: name.to_string(),
                        message: "duplicate name, skipped".to_string(),
                    });
                    None
                }
            },
        }
    };

    // --- Folders (parents before children so FK inserts succeed) ---
    let mut folders = Vec::new();
    for f in sort_folders_parents_first(&bundle.folders) {
        if let Err(msg) = validate_bundle_item(&f.name, None) {
            skipped.push(ImportIssue {
                item_type: "folder".to_string(),
                name: f.name.clone(),
                message: msg,
            });
            continue;
        }
        if let Some((action, name)) =
            decide("folder", f.id, &f.name, &existing_folders, &mut id_map, &mut skipped)
        {
            folders.push(PlannedFolder {
                action,
                row: FolderExport {
                    id: id_map[&f.id],
                    name,
                    parent_id: f.parent_id.map(|p| id_map.get(&p).copied().unwrap_or(p)),
                    sort_order: f.sort_order,
                },
            });
        }
    }

    let remap_folder = |id_map: &HashMap<EntityId, EntityId>, folder_id: Option<EntityId>| {
        folder_id.map(|f| id_map.get(&f).copied().unwrap_or(f))
    };

    // --- Templates ---
    let mut templates = Vec::new();
    for t in &bundle.templates {
        if let Err(msg) = validate_bundle_item(&t.name, Some(&t.content)) {
            skipped.push(ImportIssue {
                item_type: ITEM_TYPE_TEMPLATE.to_string(),
                name: t.name.clone(),
                message: msg,
            });
            continue;
        }
        if let Some((action, name)) = decide(
            ITEM_TYPE_TEMPLATE,
            t.id,
            &t.name,
            &existing_templates,
            &mut id_map,
            &mut skipped,
        ) {
            templates.push(PlannedTemplate {
                action,
                row: TemplateExport {
                    id: id_map[&t.id],
                    name,
                    folder_id: remap_folder(&id_map, t.folder_id),
                    ..t.clone()
                },
            });
        }
    }

    // --- Workflows ---
    let bundle_template_ids: HashSet<EntityId> = bundle.templates.iter().map(|t| t.id).collect();
    let existing_template_ids: HashSet<EntityId> =
        existing.templates.iter().map(|t| t.id).collect();

    let mut workflows = Vec::new();
    for w in &bundle.workflows {
        if let Err(msg) = validate_bundle_item(&w.name, None) {
            skipped.push(ImportIssue {
                item_type: ITEM_TYPE_WORKFLOW.to_string(),
                name: w.name.clone(),
                message: msg,
            });
            continue;
        }
        if let Some(missing) =
            missing_step_reference(w, &bundle_template_ids, &existing_template_ids)
        {
            let message = format!("step references missing template {missing}");
            if options.skip_invalid {
                skipped.push(ImportIssue {
                    item_type: ITEM_TYPE_WORKFLOW.to_string(),
                    name: w.name.clone(),
                    message,
                });
                continue;
            }
            return Err(CoreError::Validation(format!(
                "workflow '{}': {message}",
                w.name
            )));
        }
        if let Some((action, name)) = decide(
            ITEM_TYPE_WORKFLOW,
            w.id,
            &w.name,
            &existing_workflows,
            &mut id_map,
            &mut skipped,
        ) {
            workflows.push(PlannedWorkflow {
                action,
                row: WorkflowExport {
                    id: id_map[&w.id],
                    name,
                    folder_id: remap_folder(&id_map, w.folder_id),
                    steps: w
                        .steps
                        .iter()
                        .map(|s| WorkflowStepExport {
                            template_id: id_map.get(&s.template_id).copied().unwrap_or(s.template_id),
                            step_order: s.step_order,
                        })
                        .collect(),
                    ..w.clone()
                },
            });
        }
    }

    // --- Snippets ---
    let mut snippets = Vec::new();
    for s in &bundle.snippets {
        if let Err(msg) = validate_bundle_item(&s.name, Some(&s.content)) {
            skipped.push(ImportIssue {
                item_type: ITEM_TYPE_SNIPPET.to_string(),
                name: s.name.clone(),
                message: msg,
            });
            continue;
        }
        if let Some((action, name)) = decide(
            ITEM_TYPE_SNIPPET,
            s.id,
            &s.name,
            &existing_snippets,
            &mut id_map,
            &mut skipped,
        ) {
            snippets.push(PlannedSnippet {
                action,
                row: SnippetExport {
                    id: id_map[&s.id],
                    name,
                    folder_id: remap_folder(&id_map, s.folder_id),
                    ..s.clone()
                },
            });
        }
    }

    Ok(ImportPlan {
        folders,
        templates,
        workflows,
        snippets,
        skipped,
    })
}

/// Order folders so every parent precedes its children. Folders whose
/// parent is outside the bundle (pre-existing or dangling) sort first.
fn sort_folders_parents_first(folders: &[FolderExport]) -> Vec<&FolderExport> {
    let by_id: HashMap<EntityId, &FolderExport> = folders.iter().map(|f| (f.id, f)).collect();
    let mut depth_cache: HashMap<EntityId, usize> = HashMap::new();

    fn depth(
        f: &FolderExport,
        by_id: &HashMap<EntityId, &FolderExport>,
        cache: &mut HashMap<EntityId, usize>,
        guard: usize,
    ) -> usize {
        if let Some(&d) = cache.get(&f.id) {
            return d;
        }
        // `guard` bounds recursion if a dump contains a parent cycle.
        let d = match f.parent_id.and_then(|p| by_id.get(&p)) {
            Some(parent) if guard > 0 => depth(parent, by_id, cache, guard - 1) + 1,
            _ => 0,
        };
        cache.insert(f.id, d);
        d
    }

    let mut sorted: Vec<&FolderExport> = folders.iter().collect();
    sorted.sort_by_key(|f| depth(f, &by_id, &mut depth_cache, folders.len()));
    sorted
}

// ---------------------------------------------------------------------------
// Legacy localStorage dump
// ---------------------------------------------------------------------------

/// localStorage keys the legacy SPA persisted its library under.
pub const LEGACY_KEY_TEMPLATES: &str = "airprompts_templates";
pub const LEGACY_KEY_WORKFLOWS: &str = "airprompts_workflows";
pub const LEGACY_KEY_SNIPPETS: &str = "airprompts_snippets";
pub const LEGACY_KEY_FOLDERS: &str = "airprompts_folders";

/// Convert a raw localStorage dump into an [`ExportBundle`].
///
/// The dump is a JSON object keyed by localStorage key; values may be JSON
/// arrays or doubly-encoded JSON strings (localStorage stores strings).
/// Legacy ids (numbers or arbitrary strings) are remapped to fresh UUIDs
/// with all references fixed up. Malformed items are reported per-item and
/// skipped; only a dump that is not a JSON object at all is an error.
pub fn parse_legacy_dump(
    dump: &serde_json::Value,
) -> Result<(ExportBundle, Vec<ImportIssue>), CoreError> {
    let obj = dump
        .as_object()
        .ok_or_else(|| CoreError::Validation("legacy dump must be a JSON object".into()))?;

    let mut issues = Vec::new();
    let mut id_map: HashMap<String, EntityId> = HashMap::new();
    let map_id = |raw: &serde_json::Value, id_map: &mut HashMap<String, EntityId>| {
        let key = legacy_id_key(raw);
        *id_map.entry(key).or_insert_with(Uuid::new_v4)
    };

    let items = |key: &str, issues: &mut Vec<ImportIssue>| -> Vec<serde_json::Value> {
        match obj.get(key) {
            None | Some(serde_json::Value::Null) => Vec::new(),
            Some(serde_json::Value::Array(a)) => a.clone(),
            // localStorage values are strings; tolerate double encoding.
            Some(serde_json::Value::String(s)) => match serde_json::from_str(s) {
                Ok(serde_json::Value::Array(a)) => a,
                _ => {
                    issues.push(ImportIssue {
                        item_type: key.to_string(),
                        name: key.to_string(),
                        message: "value is not a JSON array".to_string(),
                    });
                    Vec::new()
                }
            },
            Some(_) => {
                issues.push(ImportIssue {
                    item_type: key.to_string(),
                    name: key.to_string(),
                    message: "value is not a JSON array".to_string(),
                });
                Vec::new()
            }
        }
    };

    // --- Folders ---
    let mut folders = Vec::new();
    for raw in items(LEGACY_KEY_FOLDERS, &mut issues) {
        match legacy_str(&raw, "name") {
            Some(name) => {
                let id = map_id(&raw["id"], &mut id_map);
                let parent_id = raw
                    .get("parentId")
                    .or_else(|| raw.get("parent_id"))
                    .filter(|v| !v.is_null())
                    .map(|v| map_id(v, &mut id_map));
                folders.push(FolderExport {
                    id,
                    name,
                    parent_id,
                    sort_order: legacy_i64(&raw, &["sortOrder", "sort_order"]).unwrap_or(0),
                });
            }
            None => issues.push(legacy_issue("folder", &raw, "missing name")),
        }
    }

    let folder_ref = |raw: &serde_json::Value, id_map: &mut HashMap<String, EntityId>| {
        raw.get("folderId")
            .or_else(|| raw.get("folder_id"))
            .filter(|v| !v.is_null())
            .map(|v| *id_map.entry(legacy_id_key(v)).or_insert_with(Uuid::new_v4))
    };

    // --- Templates ---
    let mut templates = Vec::new();
    for raw in items(LEGACY_KEY_TEMPLATES, &mut issues) {
        let (Some(name), Some(content)) = (legacy_str(&raw, "name"), legacy_str(&raw, "content"))
        else {
            issues.push(legacy_issue(ITEM_TYPE_TEMPLATE, &raw, "missing name or content"));
            continue;
        };
        templates.push(TemplateExport {
            id: map_id(&raw["id"], &mut id_map),
            name,
            description: legacy_str(&raw, "description"),
            content,
            category: legacy_str(&raw, "category")
                .unwrap_or_else(|| crate::validation::DEFAULT_CATEGORY.to_string()),
            favorite: raw.get("favorite").and_then(|v| v.as_bool()).unwrap_or(false),
            folder_id: folder_ref(&raw, &mut id_map),
        });
    }

    // --- Snippets ---
    let mut snippets = Vec::new();
    for raw in items(LEGACY_KEY_SNIPPETS, &mut issues) {
        let (Some(name), Some(content)) = (legacy_str(&raw, "name"), legacy_str(&raw, "content"))
        else {
            issues.push(legacy_issue(ITEM_TYPE_SNIPPET, &raw, "missing name or content"));
            continue;
        };
        let tags = raw
            .get("tags")
            .and_then(|v| v.as_array())
            .map(|a| {
                a.iter()
                    .filter_map(|t| t.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        snippets.push(SnippetExport {
            id: map_id(&raw["id"], &mut id_map),
            name,
            description: legacy_str(&raw, "description"),
            content,
            tags,
            favorite: raw.get("favorite").and_then(|v| v.as_bool()).unwrap_or(false),
            folder_id: folder_ref(&raw, &mut id_map),
        });
    }

    // --- Workflows ---
    let mut workflows = Vec::new();
    for raw in items(LEGACY_KEY_WORKFLOWS, &mut issues) {
        let Some(name) = legacy_str(&raw, "name") else {
            issues.push(legacy_issue(ITEM_TYPE_WORKFLOW, &raw, "missing name"));
            continue;
        };
        let mut steps = Vec::new();
        let mut bad_step = false;
        if let Some(raw_steps) = raw.get("steps").and_then(|v| v.as_array()) {
            for (i, s) in raw_steps.iter().enumerate() {
                let template_ref = s
                    .get("templateId")
                    .or_else(|| s.get("template_id"))
                    .filter(|v| !v.is_null());
                match template_ref {
                    Some(t) => steps.push(WorkflowStepExport {
                        template_id: *id_map
                            .entry(legacy_id_key(t))
                            .or_insert_with(Uuid::new_v4),
                        step_order: legacy_i64(s, &["stepOrder", "step_order"])
                            .unwrap_or(i as i64),
                    }),
                    None => {
                        issues.push(legacy_issue(
                            ITEM_TYPE_WORKFLOW,
                            &raw,
                            &format!("step {i} has no template reference"),
                        ));
                        bad_step = true;
                    }
                }
            }
        }
        if bad_step {
            continue;
        }
        workflows.push(WorkflowExport {
            id: map_id(&raw["id"], &mut id_map),
            name,
            description: legacy_str(&raw, "description"),
            category: legacy_str(&raw, "category")
                .unwrap_or_else(|| crate::validation::DEFAULT_CATEGORY.to_string()),
            favorite: raw.get("favorite").and_then(|v| v.as_bool()).unwrap_or(false),
            folder_id: folder_ref(&raw, &mut id_map),
            steps,
        });
    }

    Ok((
        ExportBundle {
            version: EXPORT_VERSION.to_string(),
            exported_at: chrono::Utc::now(),
            templates,
            workflows,
            snippets,
            folders,
        },
        issues,
    ))
}

fn legacy_id_key(raw: &serde_json::Value) -> String {
    match raw {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn legacy_str(raw: &serde_json::Value, field: &str) -> Option<String> {
    raw.get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn legacy_i64(raw: &serde_json::Value, fields: &[&str]) -> Option<i64> {
    fields.iter().find_map(|f| raw.get(*f).and_then(|v| v.as_i64()))
}

fn legacy_issue(item_type: &str, raw: &serde_json::Value, message: &str) -> ImportIssue {
    ImportIssue {
        item_type: item_type.to_string(),
        name: legacy_str(raw, "name").unwrap_or_else(|| "<unnamed>".to_string()),
        message: message.to_string(),
    }
}

/* --------------------------------------------------------------------------
   Tests
   -------------------------------------------------------------------------- */
