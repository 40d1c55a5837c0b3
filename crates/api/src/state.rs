use std::sync::Arc;

use rolegate_db::{RoleStore, UserDirectory};

use crate::authorization::AuthorizationService;
use crate::config::ServerConfig;
use crate::toolbar::AuthCollector;
use crate::view::ViewRenderer;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Role administration facade used by the admin surface.
    pub authz: Arc<AuthorizationService>,
    /// Debug toolbar widget.
    pub collector: Arc<AuthCollector>,
    /// Renders admin views.
    pub views: Arc<dyn ViewRenderer>,
}

impl AppState {
    /// Wire the services around the given storage backends.
    pub fn new(
        config: ServerConfig,
        roles: Arc<dyn RoleStore>,
        users: Arc<dyn UserDirectory>,
        views: Arc<dyn ViewRenderer>,
    ) -> Self {
        let collector = AuthCollector::new(Arc::clone(&roles), users, &config.base_url);
        Self {
            config: Arc::new(config),
            authz: Arc::new(AuthorizationService::new(roles)),
            collector: Arc::new(collector),
            views,
        }
    }
}
