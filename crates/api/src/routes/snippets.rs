//! Route definitions for the `/snippets` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::snippets;
use crate::state::AppState;

/// Routes mounted at `/snippets`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// GET    /{id}   -> get_by_id
/// PUT    /{id}   -> update
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(snippets::list).post(snippets::create))
        .route(
            "/{id}",
            get(snippets::get_by_id)
                .put(snippets::update)
                .delete(snippets::delete),
        )
}
