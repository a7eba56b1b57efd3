//! Route definitions for the `/workflows` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::workflows;
use crate::state::AppState;

/// Routes mounted at `/workflows`.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update
/// DELETE /{id}           -> delete
/// POST   /{id}/execute   -> execute
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(workflows::list).post(workflows::create))
        .route(
            "/{id}",
            get(workflows::get_by_id)
                .put(workflows::update)
                .delete(workflows::delete),
        )
        .route("/{id}/execute", post(workflows::execute))
}
