//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use agora_auth::identity::IdentityResolver;
use agora_auth::service::AuthService;
use agora_auth::store::{SessionStore, UserStore};
use agora_auth::token::TokenCodec;
use agora_core::config::AppConfig;

use crate::middleware::rate_limit::RateLimiter;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks. Stores are held behind
/// their traits so tests can wire in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,

    /// Auth service — login/refresh/logout state machine.
    pub auth_service: Arc<AuthService>,
    /// Token codec for access-token verification in the pipeline.
    pub token_codec: Arc<TokenCodec>,
    /// Live identity resolution shared by every gate.
    pub identity_resolver: Arc<IdentityResolver>,
    /// Process-local abuse-control counters.
    pub rate_limiter: Arc<RateLimiter>,

    /// User store (read-mostly for the API surface).
    pub users: Arc<dyn UserStore>,
    /// Session store.
    pub sessions: Arc<dyn SessionStore>,
}
