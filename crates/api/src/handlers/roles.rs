//! Handlers for the `/admin/roles` screens.
//!
//! All handlers require the `admin` role via [`RequireAdmin`]. Reads render a
//! view through the configured [`crate::view::ViewRenderer`]; every mutation
//! answers with a [`FlashRedirect`].

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rolegate_core::error::CoreError;
use rolegate_core::roles::RoleInput;
use rolegate_core::types::DbId;
use rolegate_db::models::role::Role;
use rolegate_db::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::AppResult;
use crate::flash::{clear_cookie_header, Flash, FlashRedirect, IncomingFlash};
use crate::messages;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// Path of the role list.
pub const ROLES_PATH: &str = "/admin/roles";

/// Path of the create form.
pub const ROLES_CREATE_PATH: &str = "/admin/roles/create";

/// Path of the edit form for role `id`.
pub fn edit_path(id: DbId) -> String {
    format!("{ROLES_PATH}/{id}/edit")
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body for `POST /admin/roles`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RolesCommand {
    Delete { hidden_id: DbId },
    Search { search: String },
}

/// Body for `POST /admin/roles/create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body for `POST /admin/roles/{id}/edit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleEditForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Permission keys to grant. Absent means none.
    #[serde(default)]
    pub sel_permissions: Vec<String>,
}

fn role_input(name: &str, description: Option<&str>) -> RoleInput {
    RoleInput::new(name, description).normalized()
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render `view` with `data`, adding `config`, `my_config` and any pending
/// flash. A flash cookie on the request is cleared on the way out, even when
/// it did not decode.
fn render(
    state: &AppState,
    view: &str,
    mut data: Map<String, Value>,
    flash: IncomingFlash,
) -> Response {
    data.insert("config".into(), state.config.view_context());
    if let Some(extra) = &state.config.views.extra {
        data.insert("my_config".into(), extra.clone());
    }

    if let Some(payload) = flash.flash {
        payload.merge_into(&mut data);
    }

    let mut response = state.views.render(view, Value::Object(data));
    if flash.present {
        if let Some(value) = clear_cookie_header() {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

/// Permission keys for the displayed roles, keyed by role id.
fn permissions_for(
    roles: &[Role],
    all: &BTreeMap<DbId, Vec<String>>,
) -> BTreeMap<DbId, Vec<String>> {
    roles
        .iter()
        .map(|role| (role.id, all.get(&role.id).cloned().unwrap_or_default()))
        .collect()
}

fn not_found_redirect(id: DbId) -> Response {
    FlashRedirect::to(ROLES_PATH, Flash::error(messages::role_not_found(id))).into_response()
}

async fn render_list(
    state: &AppState,
    roles: Vec<Role>,
    search: Option<String>,
    flash: IncomingFlash,
) -> AppResult<Response> {
    let all = state.authz.permissions_by_role().await?;
    let mut data = Map::new();
    data.insert("role_permissions".into(), json!(permissions_for(&roles, &all)));
    data.insert("roles".into(), json!(roles));
    if let Some(search) = search {
        data.insert("search".into(), search.into());
    }
    Ok(render(state, &state.config.views.roles, data, flash))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /admin/roles
///
/// All roles ordered by name, each with its granted permission keys.
pub async fn list_roles(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    flash: IncomingFlash,
) -> AppResult<Response> {
    let roles = state.authz.list_roles().await?;
    render_list(&state, roles, None, flash).await
}

/// POST /admin/roles
///
/// `delete` removes a role and redirects back to the list. `search` renders
/// the filtered list in place.
pub async fn roles_command(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    flash: IncomingFlash,
    payload: Result<Json<RolesCommand>, JsonRejection>,
) -> AppResult<Response> {
    let Json(command) = payload?;
    match command {
        RolesCommand::Delete { hidden_id } => match state.authz.delete_role(hidden_id).await {
            Ok(role) => {
                tracing::info!(
                    role_id = hidden_id,
                    admin_id = admin.user_id,
                    "Role deleted via admin"
                );
                let flash = Flash::success(messages::role_deleted(&role.name));
                Ok(FlashRedirect::to(ROLES_PATH, flash).into_response())
            }
            Err(StoreError::Core(CoreError::NotFound { .. })) => Ok(not_found_redirect(hidden_id)),
            Err(e) => Err(e.into()),
        },
        RolesCommand::Search { search } => {
            let roles = state.authz.search_roles(&search).await?;
            render_list(&state, roles, Some(search), flash).await
        }
    }
}

/// GET /admin/roles/create
pub async fn create_form(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    flash: IncomingFlash,
) -> Response {
    render(&state, &state.config.views.roles_create, Map::new(), flash)
}

/// POST /admin/roles/create
///
/// Redirects to the list on success, or back to the form with field errors
/// and the submitted input.
pub async fn create_role(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    payload: Result<Json<RoleForm>, JsonRejection>,
) -> AppResult<Response> {
    let Json(form) = payload?;
    let input = role_input(&form.name, form.description.as_deref());
    match state.authz.create_role(&input).await {
        Ok(_) => {
            let flash = Flash::success(messages::role_created(&input.name));
            Ok(FlashRedirect::to(ROLES_PATH, flash).into_response())
        }
        Err(StoreError::Core(CoreError::InvalidFields(errors))) => {
            let flash = Flash::invalid(errors, json!(form));
            Ok(FlashRedirect::to(ROLES_CREATE_PATH, flash).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /admin/roles/{id}/edit
///
/// Unknown ids redirect to the list with an error.
pub async fn edit_form(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    flash: IncomingFlash,
) -> AppResult<Response> {
    let Some(role) = state.authz.find_role(id).await? else {
        return Ok(not_found_redirect(id));
    };
    let granted = state.authz.role_permissions(id).await?;

    let mut data = Map::new();
    data.insert("role".into(), json!(role));
    data.insert("permissions".into(), json!(state.authz.permissions()));
    data.insert("role_permissions".into(), json!(granted));
    Ok(render(&state, &state.config.views.roles_edit, data, flash))
}

/// POST /admin/roles/{id}/edit
///
/// Updates the role and replaces its permissions with exactly
/// `sel_permissions`, then redirects back to the edit form. The success
/// message names the role as it was before the edit.
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    payload: Result<Json<RoleEditForm>, JsonRejection>,
) -> AppResult<Response> {
    let Json(form) = payload?;
    let Some(current) = state.authz.find_role(id).await? else {
        return Ok(not_found_redirect(id));
    };

    let input = role_input(&form.name, form.description.as_deref());
    match state.authz.edit_role(id, &input, &form.sel_permissions).await {
        Ok(_) => {
            let flash = Flash::success(messages::role_updated(&current.name));
            Ok(FlashRedirect::to(edit_path(id), flash).into_response())
        }
        Err(StoreError::Core(CoreError::InvalidFields(errors))) => {
            let flash = Flash::invalid(errors, json!(form));
            Ok(FlashRedirect::to(edit_path(id), flash).into_response())
        }
        Err(StoreError::Core(CoreError::NotFound { .. })) => Ok(not_found_redirect(id)),
        Err(e) => Err(e.into()),
    }
}
