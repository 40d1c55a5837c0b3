use serde::Serialize;

use crate::auth::jwt::JwtConfig;

/// Which storage backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL via `DATABASE_URL`.
    Postgres,
    /// In-process tables; data is lost on restart.
    Memory,
}

impl StorageBackend {
    /// Parse the `STORAGE_BACKEND` value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// View names used by the admin surface, plus optional operator data passed
/// through to every view as `my_config`.
#[derive(Debug, Clone, Serialize)]
pub struct ViewConfig {
    pub roles: String,
    pub roles_create: String,
    pub roles_edit: String,
    #[serde(skip)]
    pub extra: Option<serde_json::Value>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            roles: "auth/roles".into(),
            roles_create: "auth/roles_create".into(),
            roles_edit: "auth/roles_edit".into(),
            extra: None,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Public URL of this service, used to build links (default: `http://localhost:3000`).
    pub base_url: String,
    /// Storage backend (default: `postgres`).
    pub storage: StorageBackend,
    /// JWT token configuration.
    pub jwt: JwtConfig,
    /// Admin view names.
    pub views: ViewConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `BASE_URL`             | `http://localhost:3000`    |
    /// | `STORAGE_BACKEND`      | `postgres`                 |
    /// | `VIEW_ROLES`           | `auth/roles`               |
    /// | `VIEW_ROLES_CREATE`    | `auth/roles_create`        |
    /// | `VIEW_ROLES_EDIT`      | `auth/roles_edit`          |
    /// | `VIEW_CONFIG`          | unset (JSON object)        |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let base_url = std::env::var("BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        let storage = std::env::var("STORAGE_BACKEND")
            .map(|v| {
                StorageBackend::from_name(&v)
                    .unwrap_or_else(|| panic!("Unknown STORAGE_BACKEND '{v}'"))
            })
            .unwrap_or(StorageBackend::Postgres);

        let defaults = ViewConfig::default();
        let extra = std::env::var("VIEW_CONFIG").ok().map(|raw| {
            let value: serde_json::Value =
                serde_json::from_str(&raw).expect("VIEW_CONFIG must be valid JSON");
            assert!(value.is_object(), "VIEW_CONFIG must be a JSON object");
            value
        });
        let views = ViewConfig {
            roles: std::env::var("VIEW_ROLES").unwrap_or(defaults.roles),
            roles_create: std::env::var("VIEW_ROLES_CREATE").unwrap_or(defaults.roles_create),
            roles_edit: std::env::var("VIEW_ROLES_EDIT").unwrap_or(defaults.roles_edit),
            extra,
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            base_url,
            storage,
            jwt,
            views,
        }
    }

    /// The `config` object handed to every admin view.
    pub fn view_context(&self) -> serde_json::Value {
        serde_json::json!({
            "views": self.views,
            "base_url": self.base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_backend_names() {
        assert_eq!(StorageBackend::from_name("postgres"), Some(StorageBackend::Postgres));
        assert_eq!(StorageBackend::from_name(" Memory "), Some(StorageBackend::Memory));
        assert_eq!(StorageBackend::from_name("sqlite"), None);
    }

    #[test]
    fn view_context_omits_extra() {
        let config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            cors_origins: vec![],
            request_timeout_secs: 30,
            base_url: "http://admin.test".into(),
            storage: StorageBackend::Memory,
            jwt: JwtConfig {
                secret: "s".into(),
            },
            views: ViewConfig {
                extra: Some(serde_json::json!({ "theme": "dark" })),
                ..ViewConfig::default()
            },
        };

        let ctx = config.view_context();
        assert_eq!(ctx["views"]["roles"], "auth/roles");
        assert_eq!(ctx["base_url"], "http://admin.test");
        assert!(ctx["views"].get("extra").is_none());
    }
}
