//! Integration tests for session management and the admin surface.

mod helpers;

use http::StatusCode;

use agora_auth::store::UserStore;
use agora_entity::user::UserRole;
use helpers::TestApp;

#[tokio::test]
async fn test_list_own_sessions() {
    let app = TestApp::new().await;
    app.register("a@x.com", "alice", "Str0ng!Pass").await;
    app.login("a@x.com", "Str0ng!Pass").await;
    let body = app.login("a@x.com", "Str0ng!Pass").await;
    let token = TestApp::access_token(&body);

    let response = app.request("GET", "/api/sessions", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    // register + two logins
    assert_eq!(response.body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_revoke_own_session() {
    let app = TestApp::new().await;
    let registered = app.register("a@x.com", "alice", "Str0ng!Pass").await.body;
    let session_id = TestApp::session_id(&registered);
    let refresh = TestApp::refresh_token(&registered);

    let login = app.login("a@x.com", "Str0ng!Pass").await;
    let token = TestApp::access_token(&login);

    let response = app
        .request(
            "DELETE",
            &format!("/api/sessions/{session_id}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // The revoked session's refresh token no longer works.
    let rejected = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({"refreshToken": refresh})),
            None,
        )
        .await;
    assert_eq!(rejected.error_code(), Some("SESSION_NOT_FOUND"));
}

#[tokio::test]
async fn test_cannot_revoke_another_users_session() {
    let app = TestApp::new().await;
    let other = app.register("b@x.com", "bob", "Str0ng!Pass").await.body;
    let other_session = TestApp::session_id(&other);

    app.register("a@x.com", "alice", "Str0ng!Pass").await;
    let login = app.login("a@x.com", "Str0ng!Pass").await;
    let token = TestApp::access_token(&login);

    let response = app
        .request(
            "DELETE",
            &format!("/api/sessions/{other_session}"),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), Some("NOT_RESOURCE_OWNER"));
}

#[tokio::test]
async fn test_moderator_can_revoke_any_session() {
    let app = TestApp::new().await;
    let target = app.register("b@x.com", "bob", "Str0ng!Pass").await.body;
    let target_session = TestApp::session_id(&target);

    app.create_user("mod@x.com", "mod", "Str0ng!Pass", UserRole::Moderator)
        .await;
    let login = app.login("mod@x.com", "Str0ng!Pass").await;
    let token = TestApp::access_token(&login);

    let response = app
        .request(
            "DELETE",
            &format!("/api/sessions/{target_session}"),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_revoke_all_sessions() {
    let app = TestApp::new().await;
    let first = app.register("a@x.com", "alice", "Str0ng!Pass").await.body;
    let second = app.login("a@x.com", "Str0ng!Pass").await;
    let token = TestApp::access_token(&second);

    let response = app
        .request("POST", "/api/sessions/revoke-all", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.get("count").unwrap().as_u64().unwrap(), 2);

    for body in [&first, &second] {
        let refresh = TestApp::refresh_token(body);
        let rejected = app
            .request(
                "POST",
                "/api/auth/refresh",
                Some(serde_json::json!({"refreshToken": refresh})),
                None,
            )
            .await;
        assert_eq!(rejected.error_code(), Some("SESSION_NOT_FOUND"));
    }
}

#[tokio::test]
async fn test_change_password_revokes_all_sessions() {
    let app = TestApp::new().await;
    let registered = app.register("a@x.com", "alice", "Str0ng!Pass").await.body;
    let token = TestApp::access_token(&registered);
    let refresh = TestApp::refresh_token(&registered);

    let response = app
        .request(
            "PUT",
            "/api/users/me/password",
            Some(serde_json::json!({
                "currentPassword": "Str0ng!Pass",
                "newPassword": "N3w!Passphrase",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let rejected = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({"refreshToken": refresh})),
            None,
        )
        .await;
    assert_eq!(rejected.error_code(), Some("SESSION_NOT_FOUND"));

    app.login("a@x.com", "N3w!Passphrase").await;
}

#[tokio::test]
async fn test_admin_can_list_and_revoke_user_sessions() {
    let app = TestApp::new().await;
    let target = app.register("b@x.com", "bob", "Str0ng!Pass").await.body;
    let target_refresh = TestApp::refresh_token(&target);

    let admin = app
        .create_user("admin@x.com", "admin", "Str0ng!Pass", UserRole::Admin)
        .await;
    let login = app.login("admin@x.com", "Str0ng!Pass").await;
    let token = TestApp::access_token(&login);

    let listing = app
        .request("GET", "/api/admin/sessions", None, Some(&token))
        .await;
    assert_eq!(listing.status, StatusCode::OK);
    assert_eq!(listing.body.as_array().unwrap().len(), 2);

    let target_user = app.users.find_by_email("b@x.com").await.unwrap().unwrap();
    let response = app
        .request(
            "POST",
            &format!("/api/admin/users/{}/sessions/revoke", target_user.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.get("count").unwrap().as_u64().unwrap(), 1);

    let rejected = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({"refreshToken": target_refresh})),
            None,
        )
        .await;
    assert_eq!(rejected.error_code(), Some("SESSION_NOT_FOUND"));

    // The admin's own session is untouched.
    assert_ne!(admin.id, target_user.id);
    let me = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_cleanup_reports_removed_count() {
    let app = TestApp::new().await;
    let registered = app.register("b@x.com", "bob", "Str0ng!Pass").await.body;
    let refresh = TestApp::refresh_token(&registered);
    let access = TestApp::access_token(&registered);

    // Invalidate bob's session so it becomes sweep-eligible.
    app.request(
        "POST",
        "/api/auth/logout",
        Some(serde_json::json!({"refreshToken": refresh})),
        Some(&access),
    )
    .await;

    app.create_user("admin@x.com", "admin", "Str0ng!Pass", UserRole::Admin)
        .await;
    let login = app.login("admin@x.com", "Str0ng!Pass").await;
    let token = TestApp::access_token(&login);

    let response = app
        .request("POST", "/api/admin/sessions/cleanup", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.get("count").unwrap().as_u64().unwrap(), 1);

    // A second run removes nothing and still succeeds.
    let response = app
        .request("POST", "/api/admin/sessions/cleanup", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.get("count").unwrap().as_u64().unwrap(), 0);
}

#[tokio::test]
async fn test_admin_endpoints_require_admin_role() {
    let app = TestApp::new().await;
    app.register("a@x.com", "alice", "Str0ng!Pass").await;
    let login = app.login("a@x.com", "Str0ng!Pass").await;
    let token = TestApp::access_token(&login);

    for (method, path) in [
        ("GET", "/api/admin/sessions"),
        ("POST", "/api/admin/sessions/cleanup"),
    ] {
        let response = app.request(method, path, None, Some(&token)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{method} {path}");
        assert_eq!(response.error_code(), Some("INSUFFICIENT_PERMISSIONS"));
    }
}
