//! HTTP-level integration tests for the toolbar "Auth" tab and `/whoami`.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, get_auth, token_for};
use rolegate_core::roles::RoleInput;
use rolegate_db::{MemoryStore, RoleStore};

/// Seed alice with two groups and two roles; returns her id.
async fn seed_alice(store: &MemoryStore) -> i64 {
    let user = store.insert_user("alice", "alice@example.com").await;
    let staff = store.insert_group("Staff", Some("Everyone on payroll")).await;
    let beta = store.insert_group("Beta Testers", None).await;
    store.add_user_to_group(user, staff).await;
    store.add_user_to_group(user, beta).await;

    let editor = store.create_role(&RoleInput::new("Editor", None)).await.unwrap();
    let reviewer = store.create_role(&RoleInput::new("Reviewer", None)).await.unwrap();
    store.add_permission_to_role("edit_posts", editor).await.unwrap();
    store.add_permission_to_role("publish_posts", editor).await.unwrap();
    store.add_permission_to_role("edit_posts", reviewer).await.unwrap();
    store.add_permission_to_role("view_reports", reviewer).await.unwrap();
    store.assign_role_to_user(user, editor).await;
    store.assign_role_to_user(user, reviewer).await;
    user
}

// ---------------------------------------------------------------------------
// Toolbar panel
// ---------------------------------------------------------------------------

/// Anonymous callers get the panel with a "Not logged in" body.
#[tokio::test]
async fn panel_without_token_is_not_logged_in() {
    let (_store, app) = build_test_app();

    let response = get(app, "/api/v1/toolbar/auth").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["data"]["title"], "Auth");
    assert_eq!(json["data"]["html"], "<p>Not logged in.</p>");
    assert!(json["data"]["badge"].is_null());
    assert!(json["data"]["icon"].as_str().unwrap().starts_with("data:image/"));
}

/// A malformed token is treated as anonymous rather than rejected.
#[tokio::test]
async fn panel_with_bad_token_is_not_logged_in() {
    let (_store, app) = build_test_app();

    let response = get_auth(app, "/api/v1/toolbar/auth", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["html"], "<p>Not logged in.</p>");
}

/// A signed-in user sees the summary table.
#[tokio::test]
async fn panel_shows_current_user_summary() {
    let (store, app) = build_test_app();
    let alice = seed_alice(&store).await;

    let response = get_auth(app, "/api/v1/toolbar/auth", &token_for(alice, &[])).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let html = json["data"]["html"].as_str().unwrap();

    assert_eq!(json["data"]["badge"], alice);
    assert!(json["data"]["title_details"]
        .as_str()
        .unwrap()
        .ends_with("JwtAuthentication"));
    assert!(html.starts_with("<h4>Current User</h4><hr><table>"));
    assert!(html.contains(&format!("<td># {alice}</td>")));
    assert!(html.contains("<td>alice</td>"));
    assert!(html.contains("<td>Beta Testers, Staff</td>"));
    assert!(html.contains("<td>Editor, Reviewer</td>"));
    assert!(html.contains("<a href=\"http://admin.test/whoami\"> -[More Info]- </a>"));
}

/// A token for a user that no longer exists renders as not logged in.
#[tokio::test]
async fn panel_for_deleted_user_is_not_logged_in() {
    let (_store, app) = build_test_app();

    let response = get_auth(app, "/api/v1/toolbar/auth", &token_for(31, &[])).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["html"], "<p>Not logged in.</p>");
}

// ---------------------------------------------------------------------------
// WhoAmI
// ---------------------------------------------------------------------------

/// `/whoami` lists memberships and the union of granted permissions.
#[tokio::test]
async fn whoami_returns_identity_and_permissions() {
    let (store, app) = build_test_app();
    let alice = seed_alice(&store).await;

    let response = get_auth(app, "/whoami", &token_for(alice, &[])).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["data"]["id"], alice);
    assert_eq!(json["data"]["username"], "alice");
    assert_eq!(json["data"]["email"], "alice@example.com");
    assert_eq!(json["data"]["groups"], serde_json::json!(["Beta Testers", "Staff"]));
    assert_eq!(json["data"]["roles"], serde_json::json!(["Editor", "Reviewer"]));
    assert_eq!(
        json["data"]["permissions"],
        serde_json::json!(["edit_posts", "publish_posts", "view_reports"])
    );
}

/// `/whoami` requires authentication.
#[tokio::test]
async fn whoami_without_token_is_unauthorized() {
    let (_store, app) = build_test_app();
    let response = get(app, "/whoami").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// `/whoami` for an unknown subject is a 404.
#[tokio::test]
async fn whoami_for_unknown_user_is_not_found() {
    let (_store, app) = build_test_app();
    let response = get_auth(app, "/whoami", &token_for(77, &[])).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_ok() {
    let (_store, app) = build_test_app();
    let json = body_json(get(app, "/health").await).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["store_healthy"], true);
}
