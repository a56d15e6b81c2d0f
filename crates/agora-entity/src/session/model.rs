//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A refresh session.
///
/// One row per issued refresh token. The row, not the token's signature,
/// is the authority that makes a refresh token usable: a token whose
/// session is inactive or expired is rejected even while its signature
/// still verifies.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier.
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// SHA-256 hex digest of the refresh token.
    #[serde(skip_serializing)]
    pub refresh_token_hash: String,
    /// Whether the session is still honored. Set false on logout or
    /// revocation.
    pub active: bool,
    /// IP address observed at creation or last refresh.
    pub ip_address: String,
    /// User-Agent observed at creation or last refresh.
    pub user_agent: Option<String>,
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
    /// Absolute expiry; matches the refresh token's expiry.
    pub expires_at: DateTime<Utc>,
    /// Last successful refresh or creation time.
    pub last_seen_at: DateTime<Utc>,
}

impl Session {
    /// Check whether the session is currently usable.
    pub fn is_usable(&self) -> bool {
        self.active && self.expires_at > Utc::now()
    }

    /// Check whether the session has passed its absolute expiry.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Data required to create a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// SHA-256 hex digest of the refresh token.
    pub refresh_token_hash: String,
    /// Client IP address.
    pub ip_address: String,
    /// Client User-Agent.
    pub user_agent: Option<String>,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}
