//! Route definitions for the debug toolbar.

use axum::routing::get;
use axum::Router;

use crate::handlers::toolbar;
use crate::state::AppState;

/// Routes mounted at `/api/v1/toolbar`.
///
/// ```text
/// GET    /auth                    -> auth_panel
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/auth", get(toolbar::auth_panel))
}
