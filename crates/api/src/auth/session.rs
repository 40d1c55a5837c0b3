//! Per-request view of the authenticated identity.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use rolegate_core::types::DbId;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// What the toolbar widget needs to know about the current session.
pub trait Authentication: Send + Sync {
    /// Id of the authenticated user, if any.
    fn current_user_id(&self) -> Option<DbId>;

    fn is_logged_in(&self) -> bool {
        self.current_user_id().is_some()
    }

    /// Type name of the authentication provider, shown next to the widget title.
    fn provider_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Bearer-token authentication that never rejects.
///
/// A missing, malformed or expired token yields an anonymous session instead
/// of a 401, so read-only surfaces can render a "not logged in" state.
#[derive(Debug, Clone, Default)]
pub struct JwtAuthentication {
    pub user: Option<AuthUser>,
}

impl JwtAuthentication {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user: AuthUser) -> Self {
        Self { user: Some(user) }
    }
}

impl Authentication for JwtAuthentication {
    fn current_user_id(&self) -> Option<DbId> {
        self.user.as_ref().map(|u| u.user_id)
    }
}

impl FromRequestParts<AppState> for JwtAuthentication {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(Self::for_user(user)),
            Err(err) => {
                tracing::debug!(error = %err, "Treating request as anonymous");
                Ok(Self::anonymous())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_session_is_not_logged_in() {
        let auth = JwtAuthentication::anonymous();
        assert!(!auth.is_logged_in());
        assert_eq!(auth.current_user_id(), None);
    }

    #[test]
    fn provider_name_is_the_concrete_type() {
        let auth = JwtAuthentication::for_user(AuthUser {
            user_id: 7,
            roles: vec![],
        });
        let dynamic: &dyn Authentication = &auth;
        assert!(dynamic.is_logged_in());
        assert!(dynamic.provider_name().ends_with("JwtAuthentication"));
    }
}
