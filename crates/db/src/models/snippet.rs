use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use ts_rs::TS;
use uuid::Uuid;

/// A reusable, tag-labeled text fragment insertable via `{{tag}}`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Snippet {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub content: String,
    /// Normalized (trimmed, lowercased, deduplicated) tags.
    #[ts(type = "Array<string>")]
    pub tags: Json<Vec<String>>,
    pub favorite: bool,
    pub folder_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateSnippet {
    pub name: String,
    pub description: Option<String>,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub favorite: Option<bool>,
    pub folder_id: Option<Uuid>,
    pub folder_ids: Option<Vec<Uuid>>,
}

/// Partial update: `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateSnippet {
    pub name: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub favorite: Option<bool>,
    pub folder_id: Option<Uuid>,
    pub folder_ids: Option<Vec<Uuid>>,
}
