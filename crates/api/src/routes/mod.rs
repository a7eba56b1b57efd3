pub mod flags;
pub mod folder_favorites;
pub mod folders;
pub mod health;
pub mod snippets;
pub mod templates;
pub mod transfer;
pub mod ui_state;
pub mod workflows;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                                          service + db health
///
/// /templates                                       list, create
/// /templates/{id}                                  get, update, delete
/// /templates/{id}/render                           render with values (POST)
///
/// /workflows                                       list, create
/// /workflows/{id}                                  get, update, delete
/// /workflows/{id}/execute                          run steps (POST)
///
/// /snippets                                        list, create
/// /snippets/{id}                                   get, update, delete
///
/// /folders                                         list, create
/// /folders/{id}                                    update, delete (?force=)
/// /folders/batch-sort-order                        reorder (PATCH)
/// /folders/reseed                                  recreate defaults (POST)
///
/// /folder-favorites                                list, set
/// /folder-favorites/{item_type}/{item_id}/{folder_id}   remove
///
/// /ui-state/folders                                list, set   (rate limited)
/// /ui-state/folders/{folder_id}                    clear       (rate limited)
/// /ui-state/headers                                list, set   (rate limited)
///
/// /flags                                           evaluate all
/// /flags/{name}/override                           set override (PUT)
/// /flags/overrides                                 clear overrides (DELETE)
///
/// /export                                          download bundle
/// /import                                          apply bundle (POST)
/// /import/preview                                  dry run (POST)
/// /import/legacy                                   localStorage migration (POST)
/// ```
///
/// Takes the state by value because the UI-state rate limiter is wired
/// with `from_fn_with_state` at mount time.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/templates", templates::router())
        .nest("/workflows", workflows::router())
        .nest("/snippets", snippets::router())
        .nest("/folders", folders::router())
        .nest("/folder-favorites", folder_favorites::router())
        .nest("/ui-state", ui_state::router(state))
        .nest("/flags", flags::router())
        .merge(transfer::router())
}
