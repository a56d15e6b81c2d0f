//! Token creation and verification with per-kind keys and audiences.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use agora_core::config::{AuthConfig, parse_duration};
use agora_core::error::AppError;
use agora_entity::user::User;

use super::claims::{AccessClaims, RefreshClaims};

/// Creates and verifies signed access and refresh tokens.
///
/// Each token kind signs with its own secret and carries its own
/// `{issuer, audience}` pair, so cross-use is rejected structurally at
/// verification rather than by convention.
#[derive(Clone)]
pub struct TokenCodec {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    access_validation: Validation,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    refresh_validation: Validation,
    issuer: String,
    access_audience: String,
    refresh_audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("access_audience", &self.access_audience)
            .field("refresh_audience", &self.refresh_audience)
            .finish()
    }
}

impl TokenCodec {
    /// Creates a new codec from auth configuration.
    ///
    /// TTL strings are parsed here; a malformed value fails construction
    /// with a configuration error instead of surfacing at issuance time.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let access_ttl = parse_duration(&config.access_token_ttl)?;
        let refresh_ttl = parse_duration(&config.refresh_token_ttl)?;

        let mut access_validation = Validation::new(Algorithm::HS256);
        access_validation.validate_exp = true;
        access_validation.leeway = 5; // clock skew
        access_validation.set_audience(&[&config.access_audience]);
        access_validation.set_issuer(&[&config.issuer]);

        let mut refresh_validation = Validation::new(Algorithm::HS256);
        refresh_validation.validate_exp = true;
        refresh_validation.leeway = 5;
        refresh_validation.set_audience(&[&config.refresh_audience]);
        refresh_validation.set_issuer(&[&config.issuer]);

        Ok(Self {
            access_encoding: EncodingKey::from_secret(config.access_token_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_token_secret.as_bytes()),
            access_validation,
            refresh_encoding: EncodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            refresh_validation,
            issuer: config.issuer.clone(),
            access_audience: config.access_audience.clone(),
            refresh_audience: config.refresh_audience.clone(),
            access_ttl,
            refresh_ttl,
        })
    }

    /// Access token lifetime in seconds, for `expiresIn` response fields.
    pub fn access_ttl_seconds(&self) -> u64 {
        self.access_ttl.num_seconds().max(0) as u64
    }

    /// Issues a signed access token for the given user.
    pub fn issue_access_token(&self, user: &User) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let exp = now + self.access_ttl;

        let claims = AccessClaims {
            sub: user.id,
            role: user.role,
            status: user.status,
            iss: self.issuer.clone(),
            aud: self.access_audience.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        Ok((token, exp))
    }

    /// Issues a signed refresh token for the given subject.
    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let exp = now + self.refresh_ttl;

        let claims = RefreshClaims {
            sub: user_id,
            iss: self.issuer.clone(),
            aud: self.refresh_audience.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(|e| AppError::internal(format!("Failed to encode refresh token: {e}")))?;

        Ok((token, exp))
    }

    /// Verifies an access token string and returns its claims.
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        decode::<AccessClaims>(token, &self.access_decoding, &self.access_validation)
            .map(|data| data.claims)
            .map_err(|e| map_token_error(e, "Access"))
    }

    /// Verifies a refresh token string and returns its claims.
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, AppError> {
        decode::<RefreshClaims>(token, &self.refresh_decoding, &self.refresh_validation)
            .map(|data| data.claims)
            .map_err(|e| map_token_error(e, "Refresh"))
    }
}

/// Collapses verification failures into the two-kind taxonomy: expired,
/// or invalid. Wrong audience/issuer folds into "invalid" so the response
/// does not leak which check failed.
fn map_token_error(err: jsonwebtoken::errors::Error, kind: &str) -> AppError {
    match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::token_expired(format!("{kind} token has expired"))
        }
        _ => AppError::token_invalid(format!("{kind} token is invalid")),
    }
}
