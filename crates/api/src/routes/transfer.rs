//! Route definitions for export, import, and legacy migration.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::transfer;
use crate::state::AppState;

/// Routes mounted at the `/api` root.
///
/// ```text
/// GET    /export            -> export (bundle download)
/// POST   /import            -> import (apply with strategy)
/// POST   /import/preview    -> import_preview (dry run)
/// POST   /import/legacy     -> import_legacy (localStorage dump)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/export", get(transfer::export))
        .route("/import", post(transfer::import))
        .route("/import/preview", post(transfer::import_preview))
        .route("/import/legacy", post(transfer::import_legacy))
}
