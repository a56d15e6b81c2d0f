//! Claims payloads embedded in access and refresh tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agora_entity::user::{UserRole, UserStatus};

/// Claims payload of an access token.
///
/// Role and status here reflect the moment of issuance; the request
/// pipeline re-checks the live user record on every request and never
/// trusts these two fields for authorization decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject — the user ID.
    pub sub: Uuid,
    /// Role at issuance time.
    pub role: UserRole,
    /// Account status at issuance time.
    pub status: UserStatus,
    /// Issuer tag.
    pub iss: String,
    /// Audience tag; distinct from the refresh audience.
    pub aud: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Claims payload of a refresh token.
///
/// Deliberately minimal: the session row carries everything else, and the
/// distinct audience means an access token can never pass as a refresh
/// token or vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject — the user ID.
    pub sub: Uuid,
    /// Issuer tag.
    pub iss: String,
    /// Audience tag; distinct from the access audience.
    pub aud: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl AccessClaims {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

impl RefreshClaims {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}
