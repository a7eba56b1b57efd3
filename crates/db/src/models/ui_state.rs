use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use uuid::Uuid;

/// Persisted expand/collapse state of one folder in the sidebar tree.
/// Purely cosmetic; carries no business invariants.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct FolderUiState {
    pub folder_id: Uuid,
    pub expanded: bool,
    pub updated_at: DateTime<Utc>,
}

/// Persisted expand/collapse state of one dashboard header section.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct HeaderUiState {
    pub header_type: String,
    pub expanded: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct SetFolderUiState {
    pub folder_id: Uuid,
    pub expanded: bool,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct SetHeaderUiState {
    pub header_type: String,
    pub expanded: bool,
}
