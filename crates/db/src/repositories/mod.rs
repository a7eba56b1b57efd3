//! Repository layer: one unit struct per aggregate with static async
//! methods. Multi-table writes run inside explicit transactions so an
//! entity and its folder associations never end up half-written.

mod folder_favorite_repo;
mod folder_repo;
mod snippet_repo;
mod template_repo;
mod transfer_repo;
mod ui_state_repo;
mod workflow_repo;

pub use folder_favorite_repo::FolderFavoriteRepo;
pub use folder_repo::{FolderDeleteStats, FolderRepo, DEFAULT_FOLDERS};
pub use snippet_repo::SnippetRepo;
pub use template_repo::TemplateRepo;
pub use transfer_repo::{ImportSummary, TransferRepo};
pub use ui_state_repo::UiStateRepo;
pub use workflow_repo::WorkflowRepo;

use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

/// Default page size for list endpoints.
pub const DEFAULT_LIMIT: i64 = 100;

/// Hard cap on page size.
pub const MAX_LIMIT: i64 = 500;

/// Clamp a requested page size into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Clamp a requested offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Effective association set at create time: explicit `folder_ids` wins,
/// else the primary `folder_id` seeds a single association.
pub(crate) fn folder_associations(
    folder_ids: Option<&[Uuid]>,
    folder_id: Option<Uuid>,
) -> Vec<Uuid> {
    match folder_ids {
        Some(ids) => ids.to_vec(),
        None => folder_id.into_iter().collect(),
    }
}

/// Replace the full set of folder associations for one item.
///
/// Used by all three entity repos inside their create/update transactions.
pub(crate) async fn replace_item_folders(
    tx: &mut Transaction<'_, Sqlite>,
    item_type: &str,
    item_id: Uuid,
    folder_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM item_folders WHERE item_type = ?1 AND item_id = ?2")
        .bind(item_type)
        .bind(item_id)
        .execute(&mut **tx)
        .await?;
    for folder_id in folder_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO item_folders (item_type, item_id, folder_id) VALUES (?1, ?2, ?3)",
        )
        .bind(item_type)
        .bind(item_id)
        .bind(folder_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Remove all association and favorite rows for a deleted item. The
/// junction tables have no FK onto the item tables (item_id is polymorphic),
/// so cleanup is explicit.
pub(crate) async fn remove_item_rows(
    tx: &mut Transaction<'_, Sqlite>,
    item_type: &str,
    item_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM item_folders WHERE item_type = ?1 AND item_id = ?2")
        .bind(item_type)
        .bind(item_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM folder_favorites WHERE item_type = ?1 AND item_id = ?2")
        .bind(item_type)
        .bind(item_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
