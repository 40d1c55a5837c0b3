//! Debug toolbar widget for the current session.
//!
//! Read-only: looks up the authenticated user's groups and roles and renders
//! a small fixed-layout HTML table for the toolbar tab.

use std::sync::Arc;

use rolegate_core::types::DbId;
use rolegate_db::models::group::Group;
use rolegate_db::models::role::Role;
use rolegate_db::models::user::User;
use rolegate_db::{RoleStore, StoreResult, UserDirectory};

use crate::auth::session::Authentication;

/// Name of the toolbar tab.
pub const TITLE: &str = "Auth";

/// Body shown when nobody is authenticated.
pub const NOT_LOGGED_IN: &str = "<p>Not logged in.</p>";

/// Toolbar button icon (a user silhouette).
pub const ICON: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' \
viewBox='0 0 16 16'%3E%3Ccircle cx='8' cy='5' r='3' fill='%23555'/%3E%3Cpath \
d='M2 15c0-3.3 2.7-6 6-6s6 2.7 6 6z' fill='%23555'/%3E%3C/svg%3E";

/// Everything the widget shows about the current user.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub user: User,
    pub groups: Vec<Group>,
    pub roles: Vec<Role>,
}

impl SessionSummary {
    pub fn group_names(&self) -> String {
        join_names(self.groups.iter().map(|g| g.name.as_str()))
    }

    pub fn role_names(&self) -> String {
        join_names(self.roles.iter().map(|r| r.name.as_str()))
    }
}

pub struct AuthCollector {
    roles: Arc<dyn RoleStore>,
    users: Arc<dyn UserDirectory>,
    whoami_url: String,
}

impl AuthCollector {
    pub fn new(roles: Arc<dyn RoleStore>, users: Arc<dyn UserDirectory>, base_url: &str) -> Self {
        Self {
            roles,
            users,
            whoami_url: format!("{}/whoami", base_url.trim_end_matches('/')),
        }
    }

    pub fn title(&self) -> &'static str {
        TITLE
    }

    /// Shown next to the title: the authentication provider's type name.
    pub fn title_details(&self, auth: &dyn Authentication) -> String {
        auth.provider_name().to_string()
    }

    /// The current user's id, or `None` when not logged in.
    pub fn badge_value(&self, auth: &dyn Authentication) -> Option<DbId> {
        if auth.is_logged_in() {
            auth.current_user_id()
        } else {
            None
        }
    }

    pub fn icon(&self) -> &'static str {
        ICON
    }

    pub fn whoami_url(&self) -> &str {
        &self.whoami_url
    }

    /// Load the user, groups and roles for `user_id`.
    ///
    /// Returns `None` when the user no longer exists.
    pub async fn summary(&self, user_id: DbId) -> StoreResult<Option<SessionSummary>> {
        let Some(user) = self.users.find_user(user_id).await? else {
            return Ok(None);
        };
        let groups = self.users.get_groups_for_user(user.id).await?;
        let roles = self.roles.get_roles_for_user(user.id).await?;
        Ok(Some(SessionSummary {
            user,
            groups,
            roles,
        }))
    }

    /// The tab body for the current session.
    pub async fn display(&self, auth: &dyn Authentication) -> StoreResult<String> {
        let Some(user_id) = auth.current_user_id() else {
            return Ok(NOT_LOGGED_IN.to_string());
        };
        match self.summary(user_id).await? {
            Some(summary) => Ok(render_summary(&summary, &self.whoami_url)),
            None => {
                tracing::warn!(user_id, "Authenticated user not found in directory");
                Ok(NOT_LOGGED_IN.to_string())
            }
        }
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

fn row(label: &str, value: &str) -> String {
    format!("<tr><td>{label}</td><td>{value}</td></tr>")
}

/// Render the "Current User" table.
pub fn render_summary(summary: &SessionSummary, whoami_url: &str) -> String {
    let user = &summary.user;
    let mut html = String::from("<h4>Current User</h4><hr><table><tbody>");
    html.push_str(&format!(
        "<tr><td style=\"width:150px;\">User ID</td><td># {}</td></tr>",
        user.id
    ));
    html.push_str(&row("Username", &escape_html(&user.username)));
    html.push_str(&row("Email", &escape_html(&user.email)));
    html.push_str(&row("Groups", &escape_html(&summary.group_names())));
    html.push_str(&row("Roles", &escape_html(&summary.role_names())));
    html.push_str(&row(
        "WhoAmI?",
        &format!("<a href=\"{}\"> -[More Info]- </a>", escape_html(whoami_url)),
    ));
    html.push_str("</tbody></table>");
    html
}

/// Minimal escaping for text and double-quoted attribute values.
fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
