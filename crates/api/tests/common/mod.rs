#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use rolegate_api::auth::jwt::{Claims, JwtConfig};
use rolegate_api::config::{ServerConfig, StorageBackend, ViewConfig};
use rolegate_api::flash::{Flash, FLASH_COOKIE};
use rolegate_api::router::build_app_router;
use rolegate_api::state::AppState;
use rolegate_api::view::JsonViewRenderer;
use rolegate_core::types::DbId;
use rolegate_db::MemoryStore;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        base_url: "http://admin.test".to_string(),
        storage: StorageBackend::Memory,
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
        },
        views: ViewConfig::default(),
    }
}

/// Build the full application router over a fresh in-memory store.
///
/// Uses [`build_app_router`] so tests exercise the same middleware stack as
/// production. The store is returned for seeding and assertions.
pub fn build_test_app() -> (Arc<MemoryStore>, Router) {
    build_test_app_with(test_config())
}

pub fn build_test_app_with(config: ServerConfig) -> (Arc<MemoryStore>, Router) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        config.clone(),
        store.clone(),
        store.clone(),
        Arc::new(JsonViewRenderer),
    );
    (store, build_app_router(state, &config))
}

/// Access token for `user_id` holding `roles`, signed with the test secret
/// the way the identity service would issue it.
pub fn token_for(user_id: DbId, roles: &[&str]) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        roles: roles.iter().map(|r| r.to_string()).collect(),
        exp: now + 15 * 60,
        iat: now,
        jti: format!("test-{user_id}-{now}"),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(test_config().jwt.secret.as_bytes()),
    )
    .expect("token encoding")
}

pub fn admin_token() -> String {
    token_for(1, &["admin"])
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should not fail")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// GET with a bearer token and the given flash cookie.
pub async fn get_auth_with_cookie(
    app: Router,
    uri: &str,
    token: &str,
    cookie: &str,
) -> Response<Body> {
    let request = Request::get(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::post(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::post(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

pub fn location(response: &Response<Body>) -> &str {
    response.headers()[LOCATION].to_str().unwrap()
}

/// The `name=value` pair of the flash cookie set by `response`, ready to send
/// back in a `Cookie` header.
pub fn flash_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{FLASH_COOKIE}=")))
        .and_then(|v| v.split(';').next())
        .expect("response should set the flash cookie")
        .to_string()
}

/// Decode the flash payload set by `response`.
pub fn flash_of(response: &Response<Body>) -> Flash {
    let cookie = flash_cookie(response);
    let token = cookie
        .strip_prefix(&format!("{FLASH_COOKIE}="))
        .expect("cookie pair");
    Flash::decode(token).expect("flash should decode")
}
