//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agora_auth::service::{LoginOutcome, RefreshOutcome};
use agora_entity::session::Session;
use agora_entity::user::User;

/// Token pair returned from login and registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Session backing the refresh token.
    pub session_id: Uuid,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// Always `"Bearer"`.
    pub token_type: String,
}

impl From<LoginOutcome> for TokenPairResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            access_token: outcome.grant.access_token,
            refresh_token: outcome.grant.refresh_token,
            session_id: outcome.grant.session_id,
            expires_in: outcome.grant.expires_in,
            token_type: "Bearer".to_string(),
        }
    }
}

/// Access token returned from a refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// Newly issued access token.
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// Always `"Bearer"`.
    pub token_type: String,
}

impl From<RefreshOutcome> for RefreshResponse {
    fn from(outcome: RefreshOutcome) -> Self {
        Self {
            access_token: outcome.access_token,
            expires_in: outcome.expires_in,
            token_type: "Bearer".to_string(),
        }
    }
}

/// User profile summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User ID.
    pub id: Uuid,
    /// Email address.
    pub email: String,
    /// Public handle.
    pub username: String,
    /// Role.
    pub role: String,
    /// Account status.
    pub status: String,
    /// Created at.
    pub created_at: DateTime<Utc>,
    /// Last login.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            role: user.role.to_string(),
            status: user.status.to_string(),
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Session summary for listings. The token digest never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Session ID.
    pub id: Uuid,
    /// Owning user ID.
    pub user_id: Uuid,
    /// Client IP at creation or last refresh.
    pub ip_address: String,
    /// Client User-Agent.
    pub user_agent: Option<String>,
    /// Created at.
    pub created_at: DateTime<Utc>,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// Last refresh or creation time.
    pub last_seen_at: DateTime<Utc>,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id,
            user_id: session.user_id,
            ip_address: session.ip_address.clone(),
            user_agent: session.user_agent.clone(),
            created_at: session.created_at,
            expires_at: session.expires_at,
            last_seen_at: session.last_seen_at,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

/// Count response for bulk operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    /// Number of affected rows.
    pub count: u64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
}
