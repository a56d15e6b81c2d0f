//! Integration tests for abuse control.

mod helpers;

use http::StatusCode;

use agora_core::config::{AppConfig, RateKey, RatePolicy};
use helpers::TestApp;

/// Config with a tight auth window so limits trip quickly.
fn limited_config(auth_max: u32, escalate: bool, violation_threshold: u32) -> AppConfig {
    let mut config = helpers::test_config();
    config.rate_limit.policies.insert(
        "auth".to_string(),
        RatePolicy {
            max_requests: auth_max,
            window_seconds: 60,
            key: RateKey::Ip,
            escalate,
        },
    );
    config.rate_limit.escalation.violation_threshold = violation_threshold;
    config.rate_limit.escalation.base_block_seconds = 60;
    config
}

fn login_body() -> serde_json::Value {
    serde_json::json!({"email": "a@x.com", "password": "wrong"})
}

#[tokio::test]
async fn test_auth_attempts_are_limited_per_ip() {
    let app = TestApp::with_config(limited_config(3, false, 100)).await;

    // Three attempts pass through to the handler (and fail on
    // credentials); the fourth is cut off by the limiter.
    for _ in 0..3 {
        let response = app
            .request_from(
                "POST",
                "/api/auth/login",
                Some(login_body()),
                None,
                Some("203.0.113.9"),
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.error_code(), Some("INVALID_CREDENTIALS"));
    }

    let limited = app
        .request_from(
            "POST",
            "/api/auth/login",
            Some(login_body()),
            None,
            Some("203.0.113.9"),
        )
        .await;

    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.error_code(), Some("RATE_LIMIT_EXCEEDED"));
    // Machine-readable retry hint in body and header.
    assert!(limited.body.get("retryAfter").unwrap().as_u64().unwrap() >= 1);
    assert!(limited.retry_after.unwrap() >= 1);
}

#[tokio::test]
async fn test_limits_are_keyed_per_client_ip() {
    let app = TestApp::with_config(limited_config(1, false, 100)).await;

    let first = app
        .request_from(
            "POST",
            "/api/auth/login",
            Some(login_body()),
            None,
            Some("203.0.113.9"),
        )
        .await;
    assert_eq!(first.status, StatusCode::UNAUTHORIZED);

    let limited = app
        .request_from(
            "POST",
            "/api/auth/login",
            Some(login_body()),
            None,
            Some("203.0.113.9"),
        )
        .await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);

    // A different client IP has its own counter.
    let other = app
        .request_from(
            "POST",
            "/api/auth/login",
            Some(login_body()),
            None,
            Some("198.51.100.7"),
        )
        .await;
    assert_eq!(other.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_repeat_violations_escalate_to_ip_block() {
    let app = TestApp::with_config(limited_config(1, true, 2)).await;

    // First request consumes the window.
    app.request_from(
        "POST",
        "/api/auth/login",
        Some(login_body()),
        None,
        Some("203.0.113.9"),
    )
    .await;

    // First violation: plain rate-limit trip.
    let first = app
        .request_from(
            "POST",
            "/api/auth/login",
            Some(login_body()),
            None,
            Some("203.0.113.9"),
        )
        .await;
    assert_eq!(first.error_code(), Some("RATE_LIMIT_EXCEEDED"));

    // Second violation crosses the threshold and starts the lockout.
    let second = app
        .request_from(
            "POST",
            "/api/auth/login",
            Some(login_body()),
            None,
            Some("203.0.113.9"),
        )
        .await;
    assert_eq!(second.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(second.error_code(), Some("IP_TEMPORARILY_BLOCKED"));

    // While blocked, everything from that IP is rejected outright.
    let blocked = app
        .request_from(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({"email": "a@x.com", "password": "irrelevant"})),
            None,
            Some("203.0.113.9"),
        )
        .await;
    assert_eq!(blocked.error_code(), Some("IP_TEMPORARILY_BLOCKED"));
    assert!(blocked.retry_after.unwrap() >= 1);

    // Other clients are unaffected.
    let other = app
        .request_from(
            "POST",
            "/api/auth/login",
            Some(login_body()),
            None,
            Some("198.51.100.7"),
        )
        .await;
    assert_eq!(other.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_general_policy_covers_unauthenticated_routes() {
    let mut config = helpers::test_config();
    config.rate_limit.policies.insert(
        "general".to_string(),
        RatePolicy {
            max_requests: 2,
            window_seconds: 60,
            key: RateKey::Identity,
            escalate: false,
        },
    );
    let app = TestApp::with_config(config).await;

    for _ in 0..2 {
        let response = app
            .request_from("GET", "/api/health", None, None, Some("203.0.113.9"))
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let limited = app
        .request_from("GET", "/api/health", None, None, Some("203.0.113.9"))
        .await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
}
