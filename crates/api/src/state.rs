use std::sync::Arc;

use airprompts_core::flags::FlagService;

use crate::config::ServerConfig;
use crate::middleware::rate_limit::RateLimiter;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: airprompts_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Feature-flag service (overrides, env seeds, rollout buckets).
    pub flags: Arc<FlagService>,
    /// Sliding-window rate limiter guarding the UI-state routes.
    pub ui_state_limiter: Arc<RateLimiter>,
}
