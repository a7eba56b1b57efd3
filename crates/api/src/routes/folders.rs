//! Route definitions for the `/folders` resource.

use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::handlers::folders;
use crate::state::AppState;

/// Routes mounted at `/folders`.
///
/// ```text
/// GET    /                   -> list (with counts)
/// POST   /                   -> create
/// PUT    /{id}               -> update
/// DELETE /{id}               -> delete (?force=true to cascade)
/// PATCH  /batch-sort-order   -> batch_sort_order
/// POST   /reseed             -> reseed
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(folders::list).post(folders::create))
        .route("/{id}", put(folders::update).delete(folders::delete))
        .route("/batch-sort-order", patch(folders::batch_sort_order))
        .route("/reseed", post(folders::reseed))
}
