//! Integration tests for the request authorization pipeline.

mod helpers;

use chrono::{Duration, Utc};
use http::StatusCode;
use jsonwebtoken::{EncodingKey, Header, encode};

use agora_auth::store::UserStore;
use agora_entity::user::UserStatus;
use helpers::TestApp;

#[tokio::test]
async fn test_ban_takes_effect_before_token_expiry() {
    let app = TestApp::new().await;
    let registered = app.register("a@x.com", "alice", "Str0ng!Pass").await.body;
    let token = TestApp::access_token(&registered);

    // The token works now...
    let ok = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(ok.status, StatusCode::OK);

    // ...the user gets banned...
    let user = app
        .users
        .find_by_email("a@x.com")
        .await
        .unwrap()
        .unwrap();
    app.users.set_status(user.id, UserStatus::Banned).await;

    // ...and the very next request with the still-unexpired token fails.
    let rejected = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(rejected.status, StatusCode::FORBIDDEN);
    assert_eq!(rejected.error_code(), Some("ACCOUNT_BANNED"));
}

#[tokio::test]
async fn test_suspended_user_cannot_login() {
    let app = TestApp::new().await;
    app.register("a@x.com", "alice", "Str0ng!Pass").await;

    let user = app
        .users
        .find_by_email("a@x.com")
        .await
        .unwrap()
        .unwrap();
    app.users.set_status(user.id, UserStatus::Suspended).await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({"email": "a@x.com", "password": "Str0ng!Pass"})),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), Some("ACCOUNT_SUSPENDED"));
}

#[tokio::test]
async fn test_suspension_cuts_off_refresh() {
    let app = TestApp::new().await;
    let registered = app.register("a@x.com", "alice", "Str0ng!Pass").await.body;
    let refresh = TestApp::refresh_token(&registered);

    let user = app
        .users
        .find_by_email("a@x.com")
        .await
        .unwrap()
        .unwrap();
    app.users.set_status(user.id, UserStatus::Suspended).await;

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({"refreshToken": refresh})),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), Some("ACCOUNT_SUSPENDED"));
}

#[tokio::test]
async fn test_expired_access_token_has_its_own_code() {
    let app = TestApp::new().await;
    app.register("a@x.com", "alice", "Str0ng!Pass").await;
    let user = app
        .users
        .find_by_email("a@x.com")
        .await
        .unwrap()
        .unwrap();

    // Forge a token signed with the right key and audience whose expiry
    // is past the verification leeway. Clients seeing TOKEN_EXPIRED know
    // to refresh rather than re-login.
    let now = Utc::now();
    let claims = serde_json::json!({
        "sub": user.id,
        "role": "user",
        "status": "active",
        "iss": app.config.auth.issuer,
        "aud": app.config.auth.access_audience,
        "iat": (now - Duration::minutes(30)).timestamp(),
        "exp": (now - Duration::minutes(15)).timestamp(),
    });
    let expired = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(app.config.auth.access_token_secret.as_bytes()),
    )
    .unwrap();

    let response = app
        .request("GET", "/api/auth/me", None, Some(&expired))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), Some("TOKEN_EXPIRED"));
}

#[tokio::test]
async fn test_refresh_token_cannot_be_used_as_access_token() {
    let app = TestApp::new().await;
    let registered = app.register("a@x.com", "alice", "Str0ng!Pass").await.body;
    let refresh = TestApp::refresh_token(&registered);

    let response = app
        .request("GET", "/api/auth/me", None, Some(&refresh))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), Some("TOKEN_INVALID"));
}

#[tokio::test]
async fn test_access_token_cannot_be_used_as_refresh_token() {
    let app = TestApp::new().await;
    let registered = app.register("a@x.com", "alice", "Str0ng!Pass").await.body;
    let access = TestApp::access_token(&registered);

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({"refreshToken": access})),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), Some("TOKEN_INVALID"));
}
