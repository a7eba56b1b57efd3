//! Shared query parameter types for API handlers.
//!
//! Common query structs that appear across multiple handler modules are
//! extracted here to avoid duplication.

use serde::Deserialize;
use uuid::Uuid;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped in the repository layer via `clamp_limit` /
/// `clamp_offset`.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Common list filters shared by templates and workflows
/// (`?category=&favorite=&folder_id=`).
#[derive(Debug, Deserialize)]
pub struct ItemFilterParams {
    pub category: Option<String>,
    pub favorite: Option<bool>,
    pub folder_id: Option<Uuid>,
}
