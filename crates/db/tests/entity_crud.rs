//! Integration tests for the repository layer against a real database:
//! - Template variable extraction on create/update
//! - Folder membership through the junction table
//! - Workflow step replacement and cascade delete
//! - Folder cycle detection and delete guards
//! - Favorites and UI-state upserts

use sqlx::SqlitePool;
use uuid::Uuid;

use airprompts_db::models::folder::{CreateFolder, SetFolderFavorite, SortOrderUpdate, UpdateFolder};
use airprompts_db::models::snippet::{CreateSnippet, UpdateSnippet};
use airprompts_db::models::template::{CreateTemplate, UpdateTemplate};
use airprompts_db::models::workflow::{CreateWorkflow, CreateWorkflowStep, UpdateWorkflow};
use airprompts_db::repositories::{
    FolderFavoriteRepo, FolderRepo, SnippetRepo, TemplateRepo, UiStateRepo, WorkflowRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_template(name: &str, content: &str) -> CreateTemplate {
    CreateTemplate {
        name: name.to_string(),
        description: None,
        content: content.to_string(),
        category: None,
        favorite: None,
        folder_id: None,
        folder_ids: None,
    }
}

fn new_snippet(name: &str, content: &str) -> CreateSnippet {
    CreateSnippet {
        name: name.to_string(),
        description: None,
        content: content.to_string(),
        tags: vec![],
        favorite: None,
        folder_id: None,
        folder_ids: None,
    }
}

fn new_workflow(name: &str, steps: Vec<CreateWorkflowStep>) -> CreateWorkflow {
    CreateWorkflow {
        name: name.to_string(),
        description: None,
        category: None,
        favorite: None,
        folder_id: None,
        folder_ids: None,
        steps,
    }
}

fn new_folder(name: &str) -> CreateFolder {
    CreateFolder {
        name: name.to_string(),
        parent_id: None,
        sort_order: None,
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_template_create_extracts_variables(pool: SqlitePool) {
    let t = TemplateRepo::create(
        &pool,
        &new_template("Greeting", "Hi {name}, meet {name} and {other}. {{sig}}"),
    )
    .await
    .unwrap();

    assert_eq!(t.variables.0, vec!["name".to_string(), "other".to_string()]);
    assert_eq!(t.category, "general"); // default
    assert!(!t.favorite);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_template_update_recomputes_variables(pool: SqlitePool) {
    let t = TemplateRepo::create(&pool, &new_template("T", "Hello {name}"))
        .await
        .unwrap();

    // Name-only update keeps the stored variables.
    let t = TemplateRepo::update(
        &pool,
        t.id,
        &UpdateTemplate {
            name: Some("T2".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(t.name, "T2");
    assert_eq!(t.variables.0, vec!["name".to_string()]);

    // Content update recomputes them.
    let t = TemplateRepo::update(
        &pool,
        t.id,
        &UpdateTemplate {
            content: Some("Dear {title} {surname}".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(
        t.variables.0,
        vec!["title".to_string(), "surname".to_string()]
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_template_list_filters(pool: SqlitePool) {
    let mut input = new_template("Fav", "x");
    input.category = Some("email".into());
    input.favorite = Some(true);
    TemplateRepo::create(&pool, &input).await.unwrap();
    TemplateRepo::create(&pool, &new_template("Plain", "y"))
        .await
        .unwrap();

    let email = TemplateRepo::list(&pool, Some("email"), None, None, 100, 0)
        .await
        .unwrap();
    assert_eq!(email.len(), 1);
    assert_eq!(email[0].name, "Fav");

    let favs = TemplateRepo::list(&pool, None, Some(true), None, 100, 0)
        .await
        .unwrap();
    assert_eq!(favs.len(), 1);

    let all = TemplateRepo::list(&pool, None, None, None, 100, 0)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_template_folder_membership(pool: SqlitePool) {
    let folder = FolderRepo::create(&pool, &new_folder("Work")).await.unwrap();
    let other = FolderRepo::create(&pool, &new_folder("Home")).await.unwrap();

    let mut input = new_template("In folder", "x");
    input.folder_ids = Some(vec![folder.id]);
    let t = TemplateRepo::create(&pool, &input).await.unwrap();

    let in_folder = TemplateRepo::list(&pool, None, None, Some(folder.id), 100, 0)
        .await
        .unwrap();
    assert_eq!(in_folder.len(), 1);
    assert_eq!(in_folder[0].id, t.id);

    let elsewhere = TemplateRepo::list(&pool, None, None, Some(other.id), 100, 0)
        .await
        .unwrap();
    assert!(elsewhere.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_template_delete_cleans_junction_rows(pool: SqlitePool) {
    let folder = FolderRepo::create(&pool, &new_folder("Work")).await.unwrap();
    let mut input = new_template("Doomed", "x");
    input.folder_ids = Some(vec![folder.id]);
    let t = TemplateRepo::create(&pool, &input).await.unwrap();

    FolderFavoriteRepo::set(
        &pool,
        &SetFolderFavorite {
            item_type: "template".into(),
            item_id: t.id,
            folder_id: folder.id,
            sort_order: None,
        },
    )
    .await
    .unwrap();

    assert!(TemplateRepo::delete(&pool, t.id).await.unwrap());
    assert!(TemplateRepo::find_by_id(&pool, t.id).await.unwrap().is_none());

    let junction: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM item_folders WHERE item_id = ?1")
        .bind(t.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(junction, 0);

    let favs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM folder_favorites WHERE item_id = ?1")
        .bind(t.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(favs, 0);
}

// ---------------------------------------------------------------------------
// Snippets
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_snippet_tag_map_newest_wins(pool: SqlitePool) {
    let mut a = new_snippet("Old sig", "-- old");
    a.tags = vec!["sig".into()];
    let tags = a.tags.clone();
    let old = SnippetRepo::create(&pool, &a, tags).await.unwrap();

    let mut b = new_snippet("New sig", "-- new");
    b.tags = vec!["sig".into(), "footer".into()];
    let tags = b.tags.clone();
    SnippetRepo::create(&pool, &b, tags).await.unwrap();

    // Touch the newer row so its updated_at is strictly later.
    SnippetRepo::update(
        &pool,
        old.id,
        &UpdateSnippet {
            content: Some("-- old v2".into()),
            ..Default::default()
        },
        None,
    )
    .await
    .unwrap()
    .unwrap();

    let map = SnippetRepo::tag_map(&pool).await.unwrap();
    assert_eq!(map.get("sig").map(String::as_str), Some("-- old v2"));
    assert_eq!(map.get("footer").map(String::as_str), Some("-- new"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_snippet_tag_filter(pool: SqlitePool) {
    let mut a = new_snippet("Sig", "x");
    a.tags = vec!["sig".into()];
    let tags = a.tags.clone();
    SnippetRepo::create(&pool, &a, tags).await.unwrap();
    SnippetRepo::create(&pool, &new_snippet("Untagged", "y"), vec![])
        .await
        .unwrap();

    let hits = SnippetRepo::list(&pool, Some("sig"), None, None, 100, 0)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Sig");

    let miss = SnippetRepo::list(&pool, Some("nope"), None, None, 100, 0)
        .await
        .unwrap();
    assert!(miss.is_empty());
}

// ---------------------------------------------------------------------------
// Workflows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_workflow_create_with_steps(pool: SqlitePool) {
    let t1 = TemplateRepo::create(&pool, &new_template("One", "a"))
        .await
        .unwrap();
    let t2 = TemplateRepo::create(&pool, &new_template("Two", "b"))
        .await
        .unwrap();

    let w = WorkflowRepo::create(
        &pool,
        &new_workflow(
            "Pipeline",
            vec![
                CreateWorkflowStep {
                    template_id: t1.id,
                    step_order: None,
                },
                CreateWorkflowStep {
                    template_id: t2.id,
                    step_order: None,
                },
            ],
        ),
    )
    .await
    .unwrap();

    assert_eq!(w.steps.len(), 2);
    // step_order defaults to position
    assert_eq!(w.steps[0].step_order, 0);
    assert_eq!(w.steps[0].template_id, t1.id);
    assert_eq!(w.steps[1].step_order, 1);
    assert_eq!(w.steps[1].template_id, t2.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_workflow_update_replaces_steps(pool: SqlitePool) {
    let t1 = TemplateRepo::create(&pool, &new_template("One", "a"))
        .await
        .unwrap();
    let t2 = TemplateRepo::create(&pool, &new_template("Two", "b"))
        .await
        .unwrap();

    let w = WorkflowRepo::create(
        &pool,
        &new_workflow(
            "Pipeline",
            vec![CreateWorkflowStep {
                template_id: t1.id,
                step_order: None,
            }],
        ),
    )
    .await
    .unwrap();

    let updated = WorkflowRepo::update(
        &pool,
        w.workflow.id,
        &UpdateWorkflow {
            steps: Some(vec![
                CreateWorkflowStep {
                    template_id: t2.id,
                    step_order: None,
                },
                CreateWorkflowStep {
                    template_id: t1.id,
                    step_order: None,
                },
            ]),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.steps.len(), 2);
    assert_eq!(updated.steps[0].template_id, t2.id);
    assert_eq!(updated.steps[1].template_id, t1.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_workflow_delete_cascades_steps(pool: SqlitePool) {
    let t = TemplateRepo::create(&pool, &new_template("One", "a"))
        .await
        .unwrap();
    let w = WorkflowRepo::create(
        &pool,
        &new_workflow(
            "Pipeline",
            vec![CreateWorkflowStep {
                template_id: t.id,
                step_order: None,
            }],
        ),
    )
    .await
    .unwrap();

    assert!(WorkflowRepo::delete(&pool, w.workflow.id).await.unwrap());

    let steps: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workflow_steps WHERE workflow_id = ?1")
        .bind(w.workflow.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(steps, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_workflow_missing_template_ids(pool: SqlitePool) {
    let t = TemplateRepo::create(&pool, &new_template("One", "a"))
        .await
        .unwrap();
    let ghost = Uuid::new_v4();

    let missing = WorkflowRepo::missing_template_ids(&pool, &[t.id, ghost])
        .await
        .unwrap();
    assert_eq!(missing, vec![ghost]);
}

// ---------------------------------------------------------------------------
// Folders
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_folder_cycle_detection(pool: SqlitePool) {
    let a = FolderRepo::create(&pool, &new_folder("A")).await.unwrap();
    let mut child = new_folder("B");
    child.parent_id = Some(a.id);
    let b = FolderRepo::create(&pool, &child).await.unwrap();

    // Re-parenting A under its own child is a cycle; so is self-parenting.
    assert!(FolderRepo::would_create_cycle(&pool, a.id, b.id).await.unwrap());
    assert!(FolderRepo::would_create_cycle(&pool, a.id, a.id).await.unwrap());

    let c = FolderRepo::create(&pool, &new_folder("C")).await.unwrap();
    assert!(!FolderRepo::would_create_cycle(&pool, c.id, b.id).await.unwrap());

    let moved = FolderRepo::update(
        &pool,
        c.id,
        &UpdateFolder {
            parent_id: Some(b.id),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(moved.parent_id, Some(b.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_folder_delete_stats_and_counts(pool: SqlitePool) {
    let parent = FolderRepo::create(&pool, &new_folder("Parent")).await.unwrap();
    let mut child = new_folder("Child");
    child.parent_id = Some(parent.id);
    FolderRepo::create(&pool, &child).await.unwrap();

    let mut input = new_template("T", "x");
    input.folder_ids = Some(vec![parent.id]);
    TemplateRepo::create(&pool, &input).await.unwrap();

    let stats = FolderRepo::delete_stats(&pool, parent.id).await.unwrap();
    assert_eq!(stats.child_folders, 1);
    assert_eq!(stats.items, 1);

    let listed = FolderRepo::list_with_counts(&pool).await.unwrap();
    let parent_row = listed.iter().find(|f| f.folder.id == parent.id).unwrap();
    assert_eq!(parent_row.child_count, 1);
    assert_eq!(parent_row.item_count, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_folder_delete_cascades_children(pool: SqlitePool) {
    let parent = FolderRepo::create(&pool, &new_folder("Parent")).await.unwrap();
    let mut child = new_folder("Child");
    child.parent_id = Some(parent.id);
    let child = FolderRepo::create(&pool, &child).await.unwrap();

    assert!(FolderRepo::delete(&pool, parent.id).await.unwrap());
    assert!(FolderRepo::find_by_id(&pool, child.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_folder_batch_sort_order(pool: SqlitePool) {
    let a = FolderRepo::create(&pool, &new_folder("A")).await.unwrap();
    let b = FolderRepo::create(&pool, &new_folder("B")).await.unwrap();

    let changed = FolderRepo::batch_sort_order(
        &pool,
        &[
            SortOrderUpdate {
                id: a.id,
                sort_order: 5,
            },
            SortOrderUpdate {
                id: b.id,
                sort_order: 2,
            },
        ],
    )
    .await
    .unwrap();
    assert_eq!(changed, 2);

    let listed = FolderRepo::list_with_counts(&pool).await.unwrap();
    assert_eq!(listed[0].folder.id, b.id);
    assert_eq!(listed[1].folder.id, a.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_folder_reseed_defaults_is_idempotent(pool: SqlitePool) {
    let first = FolderRepo::reseed_defaults(&pool).await.unwrap();
    assert_eq!(first.len(), 3);

    let second = FolderRepo::reseed_defaults(&pool).await.unwrap();
    assert!(second.is_empty());
}

// ---------------------------------------------------------------------------
// Favorites and UI state
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_folder_favorite_upsert(pool: SqlitePool) {
    let folder = FolderRepo::create(&pool, &new_folder("Work")).await.unwrap();
    let t = TemplateRepo::create(&pool, &new_template("T", "x"))
        .await
        .unwrap();

    let fav = FolderFavoriteRepo::set(
        &pool,
        &SetFolderFavorite {
            item_type: "template".into(),
            item_id: t.id,
            folder_id: folder.id,
            sort_order: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(fav.sort_order, 0);

    // Setting again updates the sort order instead of inserting.
    let fav = FolderFavoriteRepo::set(
        &pool,
        &SetFolderFavorite {
            item_type: "template".into(),
            item_id: t.id,
            folder_id: folder.id,
            sort_order: Some(7),
        },
    )
    .await
    .unwrap();
    assert_eq!(fav.sort_order, 7);

    let listed = FolderFavoriteRepo::list(&pool, Some(folder.id)).await.unwrap();
    assert_eq!(listed.len(), 1);

    assert!(
        FolderFavoriteRepo::remove(&pool, "template", t.id, folder.id)
            .await
            .unwrap()
    );
    assert!(FolderFavoriteRepo::list(&pool, Some(folder.id))
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_ui_state_upserts(pool: SqlitePool) {
    let folder = FolderRepo::create(&pool, &new_folder("Work")).await.unwrap();

    let state = UiStateRepo::set_folder_state(&pool, folder.id, true)
        .await
        .unwrap();
    assert!(state.expanded);

    let state = UiStateRepo::set_folder_state(&pool, folder.id, false)
        .await
        .unwrap();
    assert!(!state.expanded);
    assert_eq!(UiStateRepo::list_folder_states(&pool).await.unwrap().len(), 1);

    assert!(UiStateRepo::clear_folder_state(&pool, folder.id).await.unwrap());
    assert!(UiStateRepo::list_folder_states(&pool).await.unwrap().is_empty());

    let header = UiStateRepo::set_header_state(&pool, "templates", false)
        .await
        .unwrap();
    assert_eq!(header.header_type, "templates");
    assert!(!header.expanded);
    assert_eq!(UiStateRepo::list_header_states(&pool).await.unwrap().len(), 1);
}
