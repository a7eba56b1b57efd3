//! HTTP-level integration tests for persisted UI state and its
//! rate-limited subtree.

mod common;

use axum::http::StatusCode;
use common::{build_test_app, delete, envelope_data, envelope_error, get, post_json};
use sqlx::SqlitePool;
use uuid::Uuid;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_folder_state_roundtrip(pool: SqlitePool) {
    let app = build_test_app(pool);
    let folder = envelope_data(
        post_json(app.clone(), "/api/folders", serde_json::json!({"name": "Work"})).await,
    )
    .await;
    let folder_id = folder["id"].as_str().unwrap().to_string();

    let saved = envelope_data(
        post_json(
            app.clone(),
            "/api/ui-state/folders",
            serde_json::json!({"folder_id": folder_id, "expanded": true}),
        )
        .await,
    )
    .await;
    assert_eq!(saved["expanded"], true);

    // Upsert flips the stored value in place.
    envelope_data(
        post_json(
            app.clone(),
            "/api/ui-state/folders",
            serde_json::json!({"folder_id": folder_id, "expanded": false}),
        )
        .await,
    )
    .await;

    let states = envelope_data(get(app.clone(), "/api/ui-state/folders").await).await;
    assert_eq!(states.as_array().unwrap().len(), 1);
    assert_eq!(states[0]["expanded"], false);

    let response = delete(app.clone(), &format!("/api/ui-state/folders/{folder_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete(app, &format!("/api/ui-state/folders/{folder_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_folder_state_requires_existing_folder(pool: SqlitePool) {
    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/ui-state/folders",
        serde_json::json!({"folder_id": Uuid::new_v4(), "expanded": true}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error = envelope_error(response).await;
    assert_eq!(error["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_header_state_rejects_unknown_section(pool: SqlitePool) {
    let app = build_test_app(pool);

    let saved = envelope_data(
        post_json(
            app.clone(),
            "/api/ui-state/headers",
            serde_json::json!({"header_type": "templates", "expanded": false}),
        )
        .await,
    )
    .await;
    assert_eq!(saved["header_type"], "templates");

    let response = post_json(
        app,
        "/api/ui-state/headers",
        serde_json::json!({"header_type": "bogus", "expanded": true}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = envelope_error(response).await;
    assert_eq!(error["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_ui_state_subtree_is_rate_limited(pool: SqlitePool) {
    // One shared app so all requests hit the same limiter bucket.
    let app = build_test_app(pool);

    for _ in 0..20 {
        let response = get(app.clone(), "/api/ui-state/headers").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get(app.clone(), "/api/ui-state/headers").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let error = envelope_error(response).await;
    assert_eq!(error["code"], "RATE_LIMITED");

    // Routes outside the subtree are unaffected.
    let response = get(app, "/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}
