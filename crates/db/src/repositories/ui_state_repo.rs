//! Repository for the persisted UI-state tables (`folder_ui_state`,
//! `header_ui_state`). Cosmetic expand/collapse flags only.

use chrono::Utc;
use uuid::Uuid;

use crate::models::ui_state::{FolderUiState, HeaderUiState};
use crate::DbPool;

pub struct UiStateRepo;

impl UiStateRepo {
    /// All persisted folder expand/collapse states.
    pub async fn list_folder_states(pool: &DbPool) -> Result<Vec<FolderUiState>, sqlx::Error> {
        sqlx::query_as("SELECT folder_id, expanded, updated_at FROM folder_ui_state")
            .fetch_all(pool)
            .await
    }

    /// Upsert the expand/collapse state of one folder.
    pub async fn set_folder_state(
        pool: &DbPool,
        folder_id: Uuid,
        expanded: bool,
    ) -> Result<FolderUiState, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO folder_ui_state (folder_id, expanded, updated_at) \
             VALUES (?1, ?2, ?3) \
             ON CONFLICT (folder_id) DO UPDATE SET expanded = ?2, updated_at = ?3 \
             RETURNING folder_id, expanded, updated_at",
        )
        .bind(folder_id)
        .bind(expanded)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    /// Drop the persisted state of one folder (falls back to the default).
    pub async fn clear_folder_state(pool: &DbPool, folder_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM folder_ui_state WHERE folder_id = ?1")
            .bind(folder_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All persisted header-section states.
    pub async fn list_header_states(pool: &DbPool) -> Result<Vec<HeaderUiState>, sqlx::Error> {
        sqlx::query_as("SELECT header_type, expanded, updated_at FROM header_ui_state")
            .fetch_all(pool)
            .await
    }

    /// Upsert the expand/collapse state of one header section.
    pub async fn set_header_state(
        pool: &DbPool,
        header_type: &str,
        expanded: bool,
    ) -> Result<HeaderUiState, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO header_ui_state (header_type, expanded, updated_at) \
             VALUES (?1, ?2, ?3) \
             ON CONFLICT (header_type) DO UPDATE SET expanded = ?2, updated_at = ?3 \
             RETURNING header_type, expanded, updated_at",
        )
        .bind(header_type)
        .bind(expanded)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }
}
