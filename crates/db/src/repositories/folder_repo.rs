//! Repository for the `folders` table and its hierarchy rules.

use airprompts_core::export::ExistingItem;
use chrono::Utc;
use uuid::Uuid;

use crate::models::folder::{CreateFolder, Folder, FolderWithCounts, SortOrderUpdate, UpdateFolder};
use crate::DbPool;

const COLUMNS: &str = "id, name, parent_id, sort_order, created_at, updated_at";

/// Root folders created by the debug reseed endpoint.
pub const DEFAULT_FOLDERS: &[&str] = &["General", "Work", "Personal"];

/// Item and child counts for a folder about to be deleted.
#[derive(Debug, Clone, Copy, serde::Serialize, ts_rs::TS)]
pub struct FolderDeleteStats {
    pub child_folders: i64,
    pub items: i64,
}

/// Provides CRUD operations for folders, including cycle detection and the
/// non-empty delete guard.
pub struct FolderRepo;

impl FolderRepo {
    /// Insert a new folder.
    pub async fn create(pool: &DbPool, input: &CreateFolder) -> Result<Folder, sqlx::Error> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO folders (id, name, parent_id, sort_order, created_at, updated_at) \
             VALUES (?1, ?2, ?3, COALESCE(?4, 0), ?5, ?5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Folder>(&query)
            .bind(Uuid::new_v4())
            .bind(&input.name)
            .bind(input.parent_id)
            .bind(input.sort_order)
            .bind(now)
            .fetch_one(pool)
            .await
    }

    /// Find a folder by ID.
    pub async fn find_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Folder>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM folders WHERE id = ?1");
        sqlx::query_as::<_, Folder>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all folders enriched with child and item counts, ordered for
    /// the sidebar tree (manual sort order, then name).
    pub async fn list_with_counts(pool: &DbPool) -> Result<Vec<FolderWithCounts>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS}, \
                (SELECT COUNT(*) FROM folders c WHERE c.parent_id = folders.id) AS child_count, \
                (SELECT COUNT(*) FROM item_folders i WHERE i.folder_id = folders.id) AS item_count \
             FROM folders \
             ORDER BY sort_order ASC, name ASC"
        );
        sqlx::query_as::<_, FolderWithCounts>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a folder. Only non-`None` fields are applied.
    ///
    /// Callers must run [`FolderRepo::would_create_cycle`] first when the
    /// parent changes; this method only writes.
    pub async fn update(
        pool: &DbPool,
        id: Uuid,
        input: &UpdateFolder,
    ) -> Result<Option<Folder>, sqlx::Error> {
        let now = Utc::now();
        let query = format!(
            "UPDATE folders SET \
                name = COALESCE(?2, name), \
                parent_id = COALESCE(?3, parent_id), \
                sort_order = COALESCE(?4, sort_order), \
                updated_at = ?5 \
             WHERE id = ?1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Folder>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.parent_id)
            .bind(input.sort_order)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Would re-parenting `id` under `new_parent` create a cycle?
    ///
    /// Walks the ancestor chain from `new_parent` to the root; a hop onto
    /// `id` itself (including `new_parent == id`) is a cycle.
    pub async fn would_create_cycle(
        pool: &DbPool,
        id: Uuid,
        new_parent: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let mut current = Some(new_parent);
        while let Some(ancestor) = current {
            if ancestor == id {
                return Ok(true);
            }
            current = sqlx::query_scalar("SELECT parent_id FROM folders WHERE id = ?1")
                .bind(ancestor)
                .fetch_optional(pool)
                .await?
                .flatten();
        }
        Ok(false)
    }

    /// Direct child-folder and associated-item counts, for the non-empty
    /// delete guard.
    pub async fn delete_stats(pool: &DbPool, id: Uuid) -> Result<FolderDeleteStats, sqlx::Error> {
        let child_folders: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM folders WHERE parent_id = ?1")
                .bind(id)
                .fetch_one(pool)
                .await?;
        let items: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM item_folders WHERE folder_id = ?1")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(FolderDeleteStats {
            child_folders,
            items,
        })
    }

    /// Delete a folder. Children and association rows cascade; legacy
    /// `folder_id` pointers on items reset to NULL.
    pub async fn delete(pool: &DbPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM folders WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply a batch of manual sort-order changes in one transaction.
    /// Returns the number of folders actually updated.
    pub async fn batch_sort_order(
        pool: &DbPool,
        updates: &[SortOrderUpdate],
    ) -> Result<u64, sqlx::Error> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;
        let mut changed = 0;
        for u in updates {
            let result =
                sqlx::query("UPDATE folders SET sort_order = ?2, updated_at = ?3 WHERE id = ?1")
                    .bind(u.id)
                    .bind(u.sort_order)
                    .bind(now)
                    .execute(&mut *tx)
                    .await?;
            changed += result.rows_affected();
        }
        tx.commit().await?;
        Ok(changed)
    }

    /// Debug helper: create the default root folders that are missing.
    /// Returns the created rows (empty when all defaults already exist).
    pub async fn reseed_defaults(pool: &DbPool) -> Result<Vec<Folder>, sqlx::Error> {
        let mut created = Vec::new();
        for (i, name) in DEFAULT_FOLDERS.iter().enumerate() {
            let exists: Option<(Uuid,)> =
                sqlx::query_as("SELECT id FROM folders WHERE name = ?1 AND parent_id IS NULL")
                    .bind(name)
                    .fetch_optional(pool)
                    .await?;
            if exists.is_none() {
                created.push(
                    Self::create(
                        pool,
                        &CreateFolder {
                            name: (*name).to_string(),
                            parent_id: None,
                            sort_order: Some(i as i64),
                        },
                    )
                    .await?,
                );
            }
        }
        Ok(created)
    }

    /// `(id, name)` view of every folder, for import duplicate checks.
    pub async fn existing_items(pool: &DbPool) -> Result<Vec<ExistingItem>, sqlx::Error> {
        let rows: Vec<(Uuid, String)> = sqlx::query_as("SELECT id, name FROM folders")
            .fetch_all(pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| ExistingItem { id, name })
            .collect())
    }
}
