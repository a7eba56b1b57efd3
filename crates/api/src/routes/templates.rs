//! Route definitions for the `/templates` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::templates;
use crate::state::AppState;

/// Routes mounted at `/templates`.
///
/// ```text
/// GET    /              -> list
/// POST   /              -> create
/// GET    /{id}          -> get_by_id
/// PUT    /{id}          -> update
/// DELETE /{id}          -> delete
/// POST   /{id}/render   -> render
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(templates::list).post(templates::create))
        .route(
            "/{id}",
            get(templates::get_by_id)
                .put(templates::update)
                .delete(templates::delete),
        )
        .route("/{id}/render", post(templates::render))
}
