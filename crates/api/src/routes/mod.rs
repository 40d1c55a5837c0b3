pub mod health;
pub mod roles;
pub mod toolbar;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /toolbar/auth                                    debug toolbar "Auth" tab
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/toolbar", toolbar::router())
}

/// Routes mounted at the root, next to `/health`.
///
/// ```text
/// GET    /whoami                  -> whoami (requires auth)
/// ```
pub fn root_routes() -> Router<AppState> {
    Router::new().route("/whoami", get(handlers::toolbar::whoami))
}
