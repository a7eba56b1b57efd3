//! HTTP-level integration tests for feature-flag evaluation and overrides.

mod common;

use axum::http::StatusCode;
use common::{build_test_app, delete, envelope_data, envelope_error, get, put_json};
use sqlx::SqlitePool;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_evaluates_all_flags(pool: SqlitePool) {
    let app = build_test_app(pool);
    let data = envelope_data(get(app, "/api/flags").await).await;
    let flags = data.as_array().unwrap();
    assert!(!flags.is_empty());

    let favorites = flags
        .iter()
        .find(|f| f["name"] == "ENABLE_FOLDER_FAVORITES")
        .unwrap();
    assert_eq!(favorites["enabled"], true);
    assert_eq!(favorites["source"], "default");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_rollout_is_stable_per_user(pool: SqlitePool) {
    let app = build_test_app(pool);

    let evaluate = |app: axum::Router| async move {
        let data = envelope_data(get(app, "/api/flags?user_id=user-42").await).await;
        data.as_array()
            .unwrap()
            .iter()
            .find(|f| f["name"] == "USE_VIRTUALIZED_LISTS")
            .unwrap()
            .clone()
    };

    let first = evaluate(app.clone()).await;
    let second = evaluate(app).await;
    assert_eq!(first["source"], "rollout");
    assert_eq!(first["enabled"], second["enabled"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_beta_user_gets_flag_ahead_of_rollout(pool: SqlitePool) {
    let app = build_test_app(pool);
    let data = envelope_data(get(app, "/api/flags?user_id=dev").await).await;
    let panel = data
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["name"] == "SHOW_DEV_PANEL")
        .unwrap();
    assert_eq!(panel["enabled"], true);
    assert_eq!(panel["source"], "beta");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_override_set_and_clear(pool: SqlitePool) {
    // Overrides live in the shared flag service, so every request must go
    // through the same app instance.
    let app = build_test_app(pool);

    let evaluation = envelope_data(
        put_json(
            app.clone(),
            "/api/flags/SHOW_DEV_PANEL/override",
            serde_json::json!({"enabled": true}),
        )
        .await,
    )
    .await;
    assert_eq!(evaluation["enabled"], true);
    assert_eq!(evaluation["source"], "override");

    let data = envelope_data(get(app.clone(), "/api/flags").await).await;
    let panel = data
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["name"] == "SHOW_DEV_PANEL")
        .unwrap()
        .clone();
    assert_eq!(panel["enabled"], true);
    assert_eq!(panel["source"], "override");

    let response = delete(app.clone(), "/api/flags/overrides").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let data = envelope_data(get(app, "/api/flags").await).await;
    let panel = data
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["name"] == "SHOW_DEV_PANEL")
        .unwrap()
        .clone();
    assert_eq!(panel["enabled"], false);
    assert_eq!(panel["source"], "default");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_override_unknown_flag_is_rejected(pool: SqlitePool) {
    let app = build_test_app(pool);
    let response = put_json(
        app,
        "/api/flags/NO_SUCH_FLAG/override",
        serde_json::json!({"enabled": true}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = envelope_error(response).await;
    assert_eq!(error["code"], "VALIDATION_ERROR");
}
