//! Integration tests for the authentication flow.

mod helpers;

use http::StatusCode;

use agora_auth::store::SessionStore;
use helpers::TestApp;

#[tokio::test]
async fn test_register_returns_token_pair() {
    let app = TestApp::new().await;

    let response = app.register("a@x.com", "alice", "Str0ng!Pass").await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert!(response.body.get("accessToken").is_some());
    assert!(response.body.get("refreshToken").is_some());
    assert!(response.body.get("sessionId").is_some());
    assert!(response.body.get("expiresIn").is_some());
    assert_eq!(
        response.body.get("tokenType").unwrap().as_str().unwrap(),
        "Bearer"
    );
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let app = TestApp::new().await;

    let response = app.register("a@x.com", "alice", "weak").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let app = TestApp::new().await;
    app.register("a@x.com", "alice", "Str0ng!Pass").await;

    let response = app.register("a@x.com", "other", "Str0ng!Pass").await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new().await;
    app.register("a@x.com", "alice", "Str0ng!Pass").await;

    let body = app.login("a@x.com", "Str0ng!Pass").await;
    assert!(body.get("accessToken").is_some());
    assert!(body.get("refreshToken").is_some());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new().await;
    app.register("a@x.com", "alice", "Str0ng!Pass").await;

    let wrong_password = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({"email": "a@x.com", "password": "nope"})),
            None,
        )
        .await;
    let unknown_email = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({"email": "nobody@x.com", "password": "nope"})),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.error_code(), Some("INVALID_CREDENTIALS"));
    assert_eq!(unknown_email.error_code(), Some("INVALID_CREDENTIALS"));
}

#[tokio::test]
async fn test_me_authenticated() {
    let app = TestApp::new().await;
    app.register("a@x.com", "alice", "Str0ng!Pass").await;
    let body = app.login("a@x.com", "Str0ng!Pass").await;
    let token = TestApp::access_token(&body);

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body.get("username").unwrap().as_str().unwrap(),
        "alice"
    );
    assert_eq!(response.body.get("role").unwrap().as_str().unwrap(), "user");
}

#[tokio::test]
async fn test_me_unauthenticated() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/auth/me", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), Some("AUTH_REQUIRED"));
}

#[tokio::test]
async fn test_garbage_bearer_token_is_invalid() {
    let app = TestApp::new().await;

    let response = app
        .request("GET", "/api/auth/me", None, Some("not-a-real-token"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), Some("TOKEN_INVALID"));
}

#[tokio::test]
async fn test_refresh_returns_access_token_only() {
    let app = TestApp::new().await;
    let body = app.register("a@x.com", "alice", "Str0ng!Pass").await.body;
    let refresh_token = body
        .get("refreshToken")
        .unwrap()
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({"refreshToken": refresh_token})),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.get("accessToken").is_some());
    assert!(response.body.get("expiresIn").is_some());
    // The refresh token is not rotated, so none is returned.
    assert!(response.body.get("refreshToken").is_none());
}

#[tokio::test]
async fn test_logout_requires_access_token() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/logout",
            Some(serde_json::json!({"refreshToken": "anything"})),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_succeeds_even_for_dead_refresh_token() {
    let app = TestApp::new().await;
    let body = app.register("a@x.com", "alice", "Str0ng!Pass").await.body;
    let access = TestApp::access_token(&body);

    let response = app
        .request(
            "POST",
            "/api/auth/logout",
            Some(serde_json::json!({"refreshToken": "garbage"})),
            Some(&access),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_full_lifecycle_scenario() {
    let app = TestApp::new().await;

    // register a@x.com / Str0ng!Pass
    let registered = app.register("a@x.com", "alice", "Str0ng!Pass").await;
    assert_eq!(registered.status, StatusCode::CREATED);

    // login succeeds, returns token pair
    let login = app.login("a@x.com", "Str0ng!Pass").await;
    let access = TestApp::access_token(&login);
    let refresh = TestApp::refresh_token(&login);
    let session_id = TestApp::session_id(&login);

    // refresh with the returned refresh token succeeds, session reused
    let refreshed = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({"refreshToken": refresh})),
            None,
        )
        .await;
    assert_eq!(refreshed.status, StatusCode::OK);
    let session = app
        .sessions
        .find_by_id(session_id)
        .await
        .unwrap()
        .expect("session should still exist");
    assert!(session.active);

    // logout with the same refresh token succeeds
    let logout = app
        .request(
            "POST",
            "/api/auth/logout",
            Some(serde_json::json!({"refreshToken": refresh})),
            Some(&access),
        )
        .await;
    assert_eq!(logout.status, StatusCode::OK);

    // refresh again with the same token fails with SESSION_NOT_FOUND
    let rejected = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({"refreshToken": refresh})),
            None,
        )
        .await;
    assert_eq!(rejected.status, StatusCode::UNAUTHORIZED);
    assert_eq!(rejected.error_code(), Some("SESSION_NOT_FOUND"));
}
