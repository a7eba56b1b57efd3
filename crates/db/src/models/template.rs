use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use ts_rs::TS;
use uuid::Uuid;

/// A reusable text block with `{variable}` placeholders.
///
/// `variables` is derived: recomputed from `content` on every write, never
/// accepted from the client.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub content: String,
    pub category: String,
    #[ts(type = "Array<string>")]
    pub variables: Json<Vec<String>>,
    pub favorite: bool,
    /// Legacy primary-folder pointer; item_folders is the authoritative
    /// many-to-many association.
    pub folder_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateTemplate {
    pub name: String,
    pub description: Option<String>,
    pub content: String,
    pub category: Option<String>,
    pub favorite: Option<bool>,
    pub folder_id: Option<Uuid>,
    /// When set, replaces the full set of folder associations.
    pub folder_ids: Option<Vec<Uuid>>,
}

/// Partial update: `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateTemplate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub favorite: Option<bool>,
    pub folder_id: Option<Uuid>,
    pub folder_ids: Option<Vec<Uuid>>,
}
