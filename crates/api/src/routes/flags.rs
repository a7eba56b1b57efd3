//! Route definitions for feature flags.

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::flags;
use crate::state::AppState;

/// Routes mounted at `/flags`.
///
/// ```text
/// GET    /                    -> list (?user_id= for rollout buckets)
/// PUT    /{name}/override     -> set_override
/// DELETE /overrides           -> clear_overrides
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(flags::list))
        .route("/{name}/override", put(flags::set_override))
        .route("/overrides", delete(flags::clear_overrides))
}
