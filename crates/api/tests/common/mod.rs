#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use airprompts_api::config::ServerConfig;
use airprompts_api::middleware::rate_limit::{
    RateLimiter, UI_STATE_MAX_REQUESTS, UI_STATE_WINDOW,
};
use airprompts_api::routes;
use airprompts_api::state::AppState;
use airprompts_core::flags::FlagService;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        flag_overrides_path: std::env::temp_dir().join("airprompts-test-overrides.json"),
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses. Flag overrides are not persisted.
pub fn build_test_app(pool: SqlitePool) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(test_config()),
        flags: Arc::new(FlagService::new(None)),
        ui_state_limiter: Arc::new(RateLimiter::new(UI_STATE_MAX_REQUESTS, UI_STATE_WINDOW)),
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .nest("/api", routes::api_routes(state.clone()))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

async fn send(app: Router, method: Method, uri: &str, body: Body) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, Body::empty()).await
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Body::from(json.to_string())).await
}

/// POST with a raw (possibly invalid-JSON) body.
pub async fn post_raw(app: Router, uri: &str, body: &str) -> Response {
    send(app, Method::POST, uri, Body::from(body.to_string())).await
}

pub async fn put_json(app: Router, uri: &str, json: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Body::from(json.to_string())).await
}

pub async fn patch_json(app: Router, uri: &str, json: serde_json::Value) -> Response {
    send(app, Method::PATCH, uri, Body::from(json.to_string())).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, Body::empty()).await
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Unwrap the `data` field of a success envelope, asserting the envelope
/// shape on the way.
pub async fn envelope_data(response: Response) -> serde_json::Value {
    let json = body_json(response).await;
    assert_eq!(json["success"], true, "expected success envelope: {json}");
    assert!(json["meta"]["timestamp"].is_string());
    json["data"].clone()
}

/// Unwrap the `error` field of a failure envelope.
pub async fn envelope_error(response: Response) -> serde_json::Value {
    let json = body_json(response).await;
    assert_eq!(json["success"], false, "expected error envelope: {json}");
    json["error"].clone()
}
