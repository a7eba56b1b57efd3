//! Repository for the `snippets` table.

use airprompts_core::export::ExistingItem;
use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::snippet::{CreateSnippet, Snippet, UpdateSnippet};
use crate::DbPool;

use super::{folder_associations, remove_item_rows, replace_item_folders};

const COLUMNS: &str =
    "id, name, description, content, tags, favorite, folder_id, created_at, updated_at";

const ITEM_TYPE: &str = "snippet";

/// Provides CRUD operations for snippets. Tags arrive pre-normalized from
/// the handler (`validation::normalize_tags`).
pub struct SnippetRepo;

impl SnippetRepo {
    /// Insert a new snippet plus its folder associations.
    pub async fn create(
        pool: &DbPool,
        input: &CreateSnippet,
        tags: Vec<String>,
    ) -> Result<Snippet, sqlx::Error> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO snippets \
                (id, name, description, content, tags, favorite, folder_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, 0), ?7, ?8, ?8) \
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Snippet>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.content)
            .bind(Json(tags))
            .bind(input.favorite)
            .bind(input.folder_id)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        let associations = folder_associations(input.folder_ids.as_deref(), input.folder_id);
        replace_item_folders(&mut tx, ITEM_TYPE, id, &associations).await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Find a snippet by ID.
    pub async fn find_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Snippet>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM snippets WHERE id = ?1");
        sqlx::query_as::<_, Snippet>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List snippets with optional filters, newest-updated first.
    ///
    /// The tag filter matches against the JSON-encoded tags column; tags
    /// are normalized (lowercased) on write, so the match is exact.
    pub async fn list(
        pool: &DbPool,
        tag: Option<&str>,
        favorite: Option<bool>,
        folder_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Snippet>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM snippets \
             WHERE (?1 IS NULL OR tags LIKE '%\"' || ?1 || '\"%') \
               AND (?2 IS NULL OR favorite = ?2) \
               AND (?3 IS NULL OR folder_id = ?3 OR EXISTS ( \
                    SELECT 1 FROM item_folders \
                     WHERE item_type = 'snippet' AND item_id = snippets.id AND folder_id = ?3)) \
             ORDER BY updated_at DESC \
             LIMIT ?4 OFFSET ?5"
        );
        sqlx::query_as::<_, Snippet>(&query)
            .bind(tag)
            .bind(favorite)
            .bind(folder_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Build the tag → content map used to resolve `{{tag}}` placeholders.
    /// When several snippets share a tag, the most recently updated wins.
    pub async fn tag_map(
        pool: &DbPool,
    ) -> Result<std::collections::HashMap<String, String>, sqlx::Error> {
        let rows: Vec<(Json<Vec<String>>, String)> =
            sqlx::query_as("SELECT tags, content FROM snippets ORDER BY updated_at ASC")
                .fetch_all(pool)
                .await?;
        let mut map = std::collections::HashMap::new();
        for (tags, content) in rows {
            for tag in tags.0 {
                map.insert(tag, content.clone());
            }
        }
        Ok(map)
    }

    /// Update a snippet. Only non-`None` fields are applied; `tags` (when
    /// provided) arrive pre-normalized.
    pub async fn update(
        pool: &DbPool,
        id: Uuid,
        input: &UpdateSnippet,
        tags: Option<Vec<String>>,
    ) -> Result<Option<Snippet>, sqlx::Error> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE snippets SET \
                name = COALESCE(?2, name), \
                description = COALESCE(?3, description), \
                content = COALESCE(?4, content), \
                tags = COALESCE(?5, tags), \
                favorite = COALESCE(?6, favorite), \
                folder_id = COALESCE(?7, folder_id), \
                updated_at = ?8 \
             WHERE id = ?1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Snippet>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.content)
            .bind(tags.map(Json))
            .bind(input.favorite)
            .bind(input.folder_id)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?;

        if updated.is_some() {
            if let Some(folder_ids) = &input.folder_ids {
                replace_item_folders(&mut tx, ITEM_TYPE, id, folder_ids).await?;
            }
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a snippet and its association/favorite rows.
    pub async fn delete(pool: &DbPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = sqlx::query("DELETE FROM snippets WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        remove_item_rows(&mut tx, ITEM_TYPE, id).await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// `(id, name)` view of every snippet, for import duplicate checks.
    pub async fn existing_items(pool: &DbPool) -> Result<Vec<ExistingItem>, sqlx::Error> {
        let rows: Vec<(Uuid, String)> = sqlx::query_as("SELECT id, name FROM snippets")
            .fetch_all(pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| ExistingItem { id, name })
            .collect())
    }
}
