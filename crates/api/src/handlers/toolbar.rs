//! Handlers for the debug toolbar tab and the `/whoami` page it links to.

use std::collections::BTreeSet;

use axum::extract::State;
use axum::Json;
use rolegate_core::error::CoreError;
use rolegate_core::types::DbId;
use serde::Serialize;

use crate::auth::session::JwtAuthentication;
use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Everything the toolbar needs to draw the "Auth" tab.
#[derive(Debug, Serialize)]
pub struct ToolbarPanel {
    pub title: &'static str,
    pub title_details: String,
    pub badge: Option<DbId>,
    pub icon: &'static str,
    pub html: String,
}

/// Response body for `GET /whoami`.
#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub groups: Vec<String>,
    pub roles: Vec<String>,
    /// Union of the permissions granted by `roles`, sorted.
    pub permissions: Vec<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/toolbar/auth
///
/// Never rejects: anonymous callers get the "Not logged in" panel.
pub async fn auth_panel(
    State(state): State<AppState>,
    auth: JwtAuthentication,
) -> AppResult<Json<DataResponse<ToolbarPanel>>> {
    let collector = &state.collector;
    let html = collector.display(&auth).await?;

    Ok(Json(DataResponse {
        data: ToolbarPanel {
            title: collector.title(),
            title_details: collector.title_details(&auth),
            badge: collector.badge_value(&auth),
            icon: collector.icon(),
            html,
        },
    }))
}

/// GET /whoami
///
/// Identity, memberships and effective permissions of the caller.
pub async fn whoami(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> AppResult<Json<DataResponse<WhoAmI>>> {
    let summary = state
        .collector
        .summary(user.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        })?;

    let mut permissions = BTreeSet::new();
    for role in &summary.roles {
        permissions.extend(state.authz.role_permissions(role.id).await?);
    }

    Ok(Json(DataResponse {
        data: WhoAmI {
            id: summary.user.id,
            username: summary.user.username,
            email: summary.user.email,
            groups: summary.groups.into_iter().map(|g| g.name).collect(),
            roles: summary.roles.into_iter().map(|r| r.name).collect(),
            permissions: permissions.into_iter().collect(),
        },
    }))
}
