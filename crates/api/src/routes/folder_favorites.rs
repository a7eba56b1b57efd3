//! Route definitions for per-folder favorites.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::folder_favorites;
use crate::state::AppState;

/// Routes mounted at `/folder-favorites`.
///
/// ```text
/// GET    /                                        -> list (?folder_id=)
/// POST   /                                        -> set (upsert)
/// DELETE /{item_type}/{item_id}/{folder_id}       -> remove
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(folder_favorites::list).post(folder_favorites::set),
        )
        .route(
            "/{item_type}/{item_id}/{folder_id}",
            delete(folder_favorites::remove),
        )
}
