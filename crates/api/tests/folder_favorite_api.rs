//! HTTP-level integration tests for per-folder favorite markings.

mod common;

use axum::http::StatusCode;
use common::{build_test_app, delete, envelope_data, get, post_json};
use sqlx::SqlitePool;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_favorite_upsert_and_remove(pool: SqlitePool) {
    let app = build_test_app(pool);

    let folder = envelope_data(
        post_json(app.clone(), "/api/folders", serde_json::json!({"name": "Work"})).await,
    )
    .await;
    let folder_id = folder["id"].as_str().unwrap().to_string();

    let template = envelope_data(
        post_json(
            app.clone(),
            "/api/templates",
            serde_json::json!({"name": "T", "content": "x", "folder_id": folder_id}),
        )
        .await,
    )
    .await;
    let template_id = template["id"].as_str().unwrap().to_string();

    let favorite = envelope_data(
        post_json(
            app.clone(),
            "/api/folder-favorites",
            serde_json::json!({
                "item_type": "template",
                "item_id": template_id,
                "folder_id": folder_id
            }),
        )
        .await,
    )
    .await;
    assert_eq!(favorite["sort_order"], 0);

    // Marking again with a sort order updates the existing row.
    let favorite = envelope_data(
        post_json(
            app.clone(),
            "/api/folder-favorites",
            serde_json::json!({
                "item_type": "template",
                "item_id": template_id,
                "folder_id": folder_id,
                "sort_order": 3
            }),
        )
        .await,
    )
    .await;
    assert_eq!(favorite["sort_order"], 3);

    let listed = envelope_data(
        get(app.clone(), &format!("/api/folder-favorites?folder_id={folder_id}")).await,
    )
    .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let uri = format!("/api/folder-favorites/template/{template_id}/{folder_id}");
    let response = delete(app.clone(), &uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = delete(app, &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_favorite_rejects_unknown_item_type(pool: SqlitePool) {
    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/folder-favorites",
        serde_json::json!({
            "item_type": "gadget",
            "item_id": "11111111-1111-4111-8111-111111111111",
            "folder_id": "22222222-2222-4222-8222-222222222222"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
