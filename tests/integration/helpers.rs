//! Shared test helpers for integration tests.
//!
//! Builds the full router over in-memory stores, so the suite exercises
//! the real extractors, middleware, and handlers without a database.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use agora_api::middleware::rate_limit::RateLimiter;
use agora_api::state::AppState;
use agora_auth::identity::IdentityResolver;
use agora_auth::password::{PasswordHasher, PasswordValidator};
use agora_auth::service::AuthService;
use agora_auth::store::{MemorySessionStore, MemoryUserStore, SessionStore, UserStore};
use agora_auth::token::TokenCodec;
use agora_core::config::{
    AppConfig, AuthConfig, DatabaseConfig, LoggingConfig, RateLimitConfig, ServerConfig,
    SessionConfig,
};
use agora_entity::user::{NewUser, User, UserRole};

/// Test application context.
pub struct TestApp {
    /// The Axum router for making test requests.
    pub router: Router,
    /// User store handle for direct state manipulation.
    pub users: Arc<MemoryUserStore>,
    /// Session store handle for direct inspection.
    pub sessions: Arc<MemorySessionStore>,
    /// The configuration the app was built with.
    pub config: AppConfig,
}

/// Base configuration for tests: cheap hashing, generous limits.
pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://unused-in-tests".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout_seconds: 1,
            idle_timeout_seconds: 1,
        },
        auth: AuthConfig {
            access_token_secret: "test-access-secret".to_string(),
            refresh_token_secret: "test-refresh-secret".to_string(),
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            argon2_parallelism: 1,
            ..AuthConfig::default()
        },
        session: SessionConfig::default(),
        rate_limit: generous_rate_limits(),
        logging: LoggingConfig::default(),
    }
}

/// Default limits are tight enough to interfere with ordinary tests;
/// raise them except where a test opts into the real thing.
fn generous_rate_limits() -> RateLimitConfig {
    let mut config = RateLimitConfig::default();
    for policy in config.policies.values_mut() {
        policy.max_requests = 10_000;
    }
    config
}

impl TestApp {
    /// Create a test application with generous rate limits.
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a test application with a specific configuration.
    pub async fn with_config(config: AppConfig) -> Self {
        let users = Arc::new(MemoryUserStore::new());
        let sessions = Arc::new(MemorySessionStore::new());

        let users_dyn: Arc<dyn UserStore> = users.clone();
        let sessions_dyn: Arc<dyn SessionStore> = sessions.clone();

        let token_codec = Arc::new(TokenCodec::new(&config.auth).expect("codec"));
        let auth_service = Arc::new(AuthService::new(
            users_dyn.clone(),
            sessions_dyn.clone(),
            token_codec.clone(),
            Arc::new(PasswordHasher::new(&config.auth)),
            PasswordValidator::new(&config.auth),
        ));
        let identity_resolver = Arc::new(IdentityResolver::new(users_dyn.clone()));
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));

        let state = AppState {
            config: Arc::new(config.clone()),
            auth_service,
            token_codec,
            identity_resolver,
            rate_limiter,
            users: users_dyn,
            sessions: sessions_dyn,
        };

        Self {
            router: agora_api::build_router(state),
            users,
            sessions,
            config,
        }
    }

    /// Create a user directly in the store with a given role, standing in
    /// for the admin provisioning surface.
    pub async fn create_user(
        &self,
        email: &str,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> User {
        let hasher = PasswordHasher::new(&self.config.auth);
        let hash = hasher.hash(password).expect("hash");

        self.users
            .create(NewUser {
                email: email.to_string(),
                username: username.to_string(),
                password_hash: hash,
                role,
            })
            .await
            .expect("create user")
    }

    /// Register through the API and return the response.
    pub async fn register(&self, email: &str, username: &str, password: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "email": email,
                "username": username,
                "password": password,
            })),
            None,
        )
        .await
    }

    /// Login through the API, asserting success, and return the body.
    pub async fn login(&self, email: &str, password: &str) -> Value {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({
                    "email": email,
                    "password": password,
                })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        response.body
    }

    /// Extract the access token from a login/register body.
    pub fn access_token(body: &Value) -> String {
        body.get("accessToken")
            .and_then(|v| v.as_str())
            .expect("accessToken missing")
            .to_string()
    }

    /// Extract the refresh token from a login/register body.
    pub fn refresh_token(body: &Value) -> String {
        body.get("refreshToken")
            .and_then(|v| v.as_str())
            .expect("refreshToken missing")
            .to_string()
    }

    /// Extract the session id from a login/register body.
    pub fn session_id(body: &Value) -> Uuid {
        body.get("sessionId")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
            .expect("sessionId missing")
    }

    /// Make an HTTP request to the test app.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        self.request_from(method, path, body, token, None).await
    }

    /// Make an HTTP request with a spoofed client IP.
    pub async fn request_from(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
        client_ip: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        if let Some(ip) = client_ip {
            req = req.header("x-forwarded-for", ip);
        }

        let req = req.body(Body::from(body_str)).expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("send request");

        let status = response.status();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            retry_after,
        }
    }
}

/// Response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Parsed JSON body.
    pub body: Value,
    /// Retry-After header, if present.
    pub retry_after: Option<u64>,
}

impl TestResponse {
    /// The machine-readable error code, if any.
    pub fn error_code(&self) -> Option<&str> {
        self.body.get("error").and_then(|v| v.as_str())
    }
}
