use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use uuid::Uuid;

/// A hierarchical grouping container. Children cascade-delete with their
/// parent; items associate many-to-many through `item_folders`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A folder enriched with child and item counts for the sidebar tree.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct FolderWithCounts {
    #[sqlx(flatten)]
    #[serde(flatten)]
    #[ts(flatten)]
    pub folder: Folder,
    pub child_count: i64,
    pub item_count: i64,
}

impl std::ops::Deref for FolderWithCounts {
    type Target = Folder;
    fn deref(&self) -> &Self::Target {
        &self.folder
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateFolder {
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub sort_order: Option<i64>,
}

/// Partial update: `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateFolder {
    pub name: Option<String>,
    pub parent_id: Option<Uuid>,
    pub sort_order: Option<i64>,
}

/// One entry of a `PATCH /folders/batch-sort-order` request.
#[derive(Debug, Clone, Deserialize, TS)]
pub struct SortOrderUpdate {
    pub id: Uuid,
    pub sort_order: i64,
}

/// Junction row associating an item with a folder.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ItemFolder {
    pub item_type: String,
    pub item_id: Uuid,
    pub folder_id: Uuid,
}

/// Per-folder favorite marking, independent of the entity's global
/// `favorite` flag.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct FolderFavorite {
    pub item_type: String,
    pub item_id: Uuid,
    pub folder_id: Uuid,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct SetFolderFavorite {
    pub item_type: String,
    pub item_id: Uuid,
    pub folder_id: Uuid,
    pub sort_order: Option<i64>,
}
