//! Repository for the `templates` table.

use airprompts_core::export::ExistingItem;
use airprompts_core::template::extract_variables;
use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::template::{CreateTemplate, Template, UpdateTemplate};
use crate::DbPool;

use super::{folder_associations, remove_item_rows, replace_item_folders};

const COLUMNS: &str =
    "id, name, description, content, category, variables, favorite, folder_id, created_at, updated_at";

/// Item type tag used in the polymorphic junction tables.
const ITEM_TYPE: &str = "template";

/// Provides CRUD operations for templates.
///
/// `variables` is always recomputed from `content` here; callers cannot
/// supply it.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a new template plus its folder associations, returning the
    /// created row.
    pub async fn create(pool: &DbPool, input: &CreateTemplate) -> Result<Template, sqlx::Error> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let variables = Json(extract_variables(&input.content));

        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO templates \
                (id, name, description, content, category, variables, favorite, folder_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, COALESCE(?5, 'general'), ?6, COALESCE(?7, 0), ?8, ?9, ?9) \
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.content)
            .bind(&input.category)
            .bind(&variables)
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

    /// Find a template by ID.
    pub async fn find_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = ?1");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List templates with optional filters, newest-updated first.
    ///
    /// The folder filter matches both the legacy `folder_id` pointer and
    /// the many-to-many associations.
    pub async fn list(
        pool: &DbPool,
        category: Option<&str>,
        favorite: Option<bool>,
        folder_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Template>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM templates \
             WHERE (?1 IS NULL OR category = ?1) \
               AND (?2 IS NULL OR favorite = ?2) \
               AND (?3 IS NULL OR folder_id = ?3 OR EXISTS ( \
                    SELECT 1 FROM item_folders \
                     WHERE item_type = 'template' AND item_id = templates.id AND folder_id = ?3)) \
             ORDER BY updated_at DESC \
             LIMIT ?4 OFFSET ?5"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(category)
            .bind(favorite)
            .bind(folder_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a template. Only non-`None` fields are applied; a content
    /// change recomputes `variables` in the same statement.
    pub async fn update(
        pool: &DbPool,
        id: Uuid,
        input: &UpdateTemplate,
    ) -> Result<Option<Template>, sqlx::Error> {
        let now = Utc::now();
        let variables = input
            .content
            .as_deref()
            .map(|c| Json(extract_variables(c)));

        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE templates SET \
                name = COALESCE(?2, name), \
                description = COALESCE(?3, description), \
                content = COALESCE(?4, content), \
                category = COALESCE(?5, category), \
                variables = COALESCE(?6, variables), \
                favorite = COALESCE(?7, favorite), \
                folder_id = COALESCE(?8, folder_id), \
                updated_at = ?9 \
             WHERE id = ?1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.content)
            .bind(&input.category)
            .bind(&variables)
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

    /// Delete a template and its association/favorite rows. Returns `true`
    /// if a row was removed.
    pub async fn delete(pool: &DbPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = sqlx::query("DELETE FROM templates WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        remove_item_rows(&mut tx, ITEM_TYPE, id).await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// `(id, name)` view of every template, for import duplicate checks.
    pub async fn existing_items(pool: &DbPool) -> Result<Vec<ExistingItem>, sqlx::Error> {
        let rows: Vec<(Uuid, String)> = sqlx::query_as("SELECT id, name FROM templates")
            .fetch_all(pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| ExistingItem { id, name })
            .collect())
    }
}
