//! Route definitions for the `/admin/roles` screens.

use axum::routing::get;
use axum::Router;

use crate::handlers::roles;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /roles                   -> list_roles
/// POST   /roles                   -> roles_command (delete | search)
/// GET    /roles/create            -> create_form
/// POST   /roles/create            -> create_role
/// GET    /roles/{id}/edit         -> edit_form
/// POST   /roles/{id}/edit         -> update_role
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/roles", get(roles::list_roles).post(roles::roles_command))
        .route(
            "/roles/create",
            get(roles::create_form).post(roles::create_role),
        )
        .route(
            "/roles/{id}/edit",
            get(roles::edit_form).post(roles::update_role),
        )
}
