//! Route definitions for persisted UI state.
//!
//! The whole subtree sits behind the sliding-window rate limiter.

use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;

use crate::handlers::ui_state;
use crate::middleware::rate_limit::ui_state_rate_limit;
use crate::state::AppState;

/// Routes mounted at `/ui-state`.
///
/// ```text
/// GET    /folders               -> list_folder_states
/// POST   /folders               -> set_folder_state
/// DELETE /folders/{folder_id}   -> clear_folder_state
/// GET    /headers               -> list_header_states
/// POST   /headers               -> set_header_state
/// ```
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/folders",
            get(ui_state::list_folder_states).post(ui_state::set_folder_state),
        )
        .route(
            "/folders/{folder_id}",
            axum::routing::delete(ui_state::clear_folder_state),
        )
        .route(
            "/headers",
            get(ui_state::list_header_states).post(ui_state::set_header_state),
        )
        .route_layer(from_fn_with_state(state, ui_state_rate_limit))
}
