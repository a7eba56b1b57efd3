//! In-memory sliding-window rate limiter.
//!
//! Guards the UI-state routes: the sidebar fires a persistence call on
//! every expand/collapse, and a stuck client can hammer them. Limits are
//! per client key (forwarded IP when present, one shared bucket for
//! direct local traffic).

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::response::ApiErrorResponse;
use crate::state::AppState;

/// Requests allowed per key within one window.
pub const UI_STATE_MAX_REQUESTS: usize = 20;

/// Window length.
pub const UI_STATE_WINDOW: Duration = Duration::from_secs(1);

/// Sliding-window request counter keyed by client.
///
/// Each key holds the timestamps of its requests inside the current
/// window; stale entries are pruned on every check, so the window slides
/// rather than resetting in fixed ticks.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    buckets: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request for `key` at `now`. Returns `false` when the key
    /// has exhausted its window.
    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut buckets = self
            .buckets
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let bucket = buckets.entry(key.to_string()).or_default();

        while let Some(&front) = bucket.front() {
            if now.duration_since(front) >= self.window {
                bucket.pop_front();
            } else {
                break;
            }
        }

        if bucket.len() >= self.max_requests {
            return false;
        }
        bucket.push_back(now);
        true
    }

    /// Record a request for `key` now.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }
}

/// Client key for rate limiting: first `x-forwarded-for` hop when the
/// request came through a proxy, otherwise a shared local bucket.
fn client_key(req: &Request) -> String {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "local".to_string())
}

/// Axum middleware wrapping the UI-state routes.
pub async fn ui_state_rate_limit(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let key = client_key(&req);
    if !state.ui_state_limiter.check(&key) {
        tracing::warn!(%key, "UI-state rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            ApiErrorResponse::new(
                "RATE_LIMITED",
                "Too many UI-state requests, slow down".to_string(),
                None,
            ),
        )
            .into_response();
    }
    next.run(req).await
}

/* ------------------------------------------------------------------------- */
