//! HTTP-level integration tests for template and snippet endpoints.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router
//! without an actual TCP listener.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, delete, envelope_data, envelope_error, get, post_json, put_json,
};
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_template_derives_variables(pool: SqlitePool) {
    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/templates",
        serde_json::json!({"name": "Greeting", "content": "Hi {name}"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let data = envelope_data(response).await;
    assert_eq!(data["name"], "Greeting");
    assert_eq!(data["variables"], serde_json::json!(["name"]));
    assert_eq!(data["category"], "general");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_template_empty_name_is_rejected(pool: SqlitePool) {
    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/templates",
        serde_json::json!({"name": "   ", "content": "x"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = envelope_error(response).await;
    assert_eq!(error["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_template_recomputes_variables(pool: SqlitePool) {
    let app = build_test_app(pool.clone());
    let created = envelope_data(
        post_json(
            app,
            "/api/templates",
            serde_json::json!({"name": "T", "content": "Hi {name}"}),
        )
        .await,
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    // Name-only update leaves variables alone.
    let app = build_test_app(pool.clone());
    let updated = envelope_data(
        put_json(
            app,
            &format!("/api/templates/{id}"),
            serde_json::json!({"name": "T2"}),
        )
        .await,
    )
    .await;
    assert_eq!(updated["variables"], serde_json::json!(["name"]));

    let app = build_test_app(pool);
    let updated = envelope_data(
        put_json(
            app,
            &format!("/api/templates/{id}"),
            serde_json::json!({"content": "Dear {title} {surname}"}),
        )
        .await,
    )
    .await;
    assert_eq!(updated["variables"], serde_json::json!(["title", "surname"]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_get_nonexistent_template_returns_404(pool: SqlitePool) {
    let app = build_test_app(pool);
    let response = get(
        app,
        "/api/templates/00000000-0000-4000-8000-000000000000",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error = envelope_error(response).await;
    assert_eq!(error["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_template_returns_204(pool: SqlitePool) {
    let app = build_test_app(pool.clone());
    let created = envelope_data(
        post_json(
            app,
            "/api/templates",
            serde_json::json!({"name": "Doomed", "content": "x"}),
        )
        .await,
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let app = build_test_app(pool.clone());
    let response = delete(app, &format!("/api/templates/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = build_test_app(pool);
    let response = get(app, &format!("/api/templates/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_render_template(pool: SqlitePool) {
    let app = build_test_app(pool.clone());
    post_json(
        app,
        "/api/snippets",
        serde_json::json!({"name": "Sig", "content": "-- Alice", "tags": ["sig"]}),
    )
    .await;

    let app = build_test_app(pool.clone());
    let created = envelope_data(
        post_json(
            app,
            "/api/templates",
            serde_json::json!({"name": "Mail", "content": "Hi {name}\n{{sig}}"}),
        )
        .await,
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let app = build_test_app(pool.clone());
    let data = envelope_data(
        post_json(
            app,
            &format!("/api/templates/{id}/render"),
            serde_json::json!({"values": {"name": "Bob"}}),
        )
        .await,
    )
    .await;
    assert_eq!(data["output"], "Hi Bob\n-- Alice");

    // A missing value fails the render with a field-level message.
    let app = build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/templates/{id}/render"),
        serde_json::json!({"values": {}}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = envelope_error(response).await;
    assert!(error["message"].as_str().unwrap().contains("name"));
}

// ---------------------------------------------------------------------------
// Snippets
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_snippet_normalizes_tags(pool: SqlitePool) {
    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/snippets",
        serde_json::json!({
            "name": "Sig",
            "content": "-- Alice",
            "tags": ["  Sig ", "sig", "FOOTER"]
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let data = envelope_data(response).await;
    assert_eq!(data["tags"], serde_json::json!(["sig", "footer"]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_snippets_by_tag(pool: SqlitePool) {
    let app = build_test_app(pool.clone());
    post_json(
        app,
        "/api/snippets",
        serde_json::json!({"name": "Sig", "content": "x", "tags": ["sig"]}),
    )
    .await;
    let app = build_test_app(pool.clone());
    post_json(
        app,
        "/api/snippets",
        serde_json::json!({"name": "Plain", "content": "y"}),
    )
    .await;

    let app = build_test_app(pool);
    let data = envelope_data(get(app, "/api/snippets?tag=sig").await).await;
    let items = data.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Sig");
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_health_reports_db(pool: SqlitePool) {
    let app = build_test_app(pool);
    let response = get(app, "/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
}
