//! Shared response envelope for API handlers.
//!
//! Every endpoint responds with the same shape, success or error:
//!
//! ```json
//! { "success": true,  "data": ...,  "meta": { "timestamp": "...", "version": "0.1.0" } }
//! { "success": false, "error": { "code": "...", "message": "..." }, "meta": { ... } }
//! ```
//!
//! Handlers build the success side with [`ApiResponse::ok`]; the error side
//! is produced by `AppError::into_response` so no handler ever assembles an
//! error body by hand.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Envelope metadata attached to every response.
#[derive(Debug, Serialize)]
pub struct Meta {
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
}

impl Meta {
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Error payload inside a failed envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    /// Structured extra context (e.g. folder delete guard counts).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

/// Standard success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub meta: Meta,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 envelope around `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            meta: Meta::now(),
        }
    }

    /// 201 envelope around `data`.
    pub fn created(data: T) -> (StatusCode, Self) {
        (StatusCode::CREATED, Self::ok(data))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Failed envelope, shared by `AppError` and the rate limiter.
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
    pub meta: Meta,
}

impl ApiErrorResponse {
    pub fn new(code: &'static str, message: String, detail: Option<serde_json::Value>) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                code,
                message,
                detail,
            },
            meta: Meta::now(),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
