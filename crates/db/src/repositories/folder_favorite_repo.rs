//! Repository for the `folder_favorites` table.

use uuid::Uuid;

use crate::models::folder::{FolderFavorite, SetFolderFavorite};
use crate::DbPool;

const COLUMNS: &str = "item_type, item_id, folder_id, sort_order";

/// Per-folder favorite marking and ordering, independent of the entity's
/// global `favorite` flag.
pub struct FolderFavoriteRepo;

impl FolderFavoriteRepo {
    /// List favorites, optionally restricted to one folder, in manual order.
    pub async fn list(
        pool: &DbPool,
        folder_id: Option<Uuid>,
    ) -> Result<Vec<FolderFavorite>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM folder_favorites \
             WHERE (?1 IS NULL OR folder_id = ?1) \
             ORDER BY folder_id ASC, sort_order ASC"
        );
        sqlx::query_as::<_, FolderFavorite>(&query)
            .bind(folder_id)
            .fetch_all(pool)
            .await
    }

    /// Mark an item as a favorite within a folder (or reorder an existing
    /// marking). Upserts on the `(item_type, item_id, folder_id)` key.
    pub async fn set(
        pool: &DbPool,
        input: &SetFolderFavorite,
    ) -> Result<FolderFavorite, sqlx::Error> {
        let query = format!(
            "INSERT INTO folder_favorites (item_type, item_id, folder_id, sort_order) \
             VALUES (?1, ?2, ?3, COALESCE(?4, 0)) \
             ON CONFLICT (item_type, item_id, folder_id) \
             DO UPDATE SET sort_order = COALESCE(?4, folder_favorites.sort_order) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FolderFavorite>(&query)
            .bind(&input.item_type)
            .bind(input.item_id)
            .bind(input.folder_id)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    /// Remove a per-folder favorite marking.
    pub async fn remove(
        pool: &DbPool,
        item_type: &str,
        item_id: Uuid,
        folder_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM folder_favorites \
             WHERE item_type = ?1 AND item_id = ?2 AND folder_id = ?3",
        )
        .bind(item_type)
        .bind(item_id)
        .bind(folder_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
