//! Unified application error types for Agora.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the `?` operator. The error kind doubles as the
//! machine-readable code sent to clients, so the set of variants mirrors
//! the error taxonomy of the auth core rather than a generic HTTP split.

use std::fmt;

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Unknown email or wrong password. The two are intentionally
    /// indistinguishable to prevent user enumeration.
    InvalidCredentials,
    /// A structurally valid token whose expiry has passed.
    TokenExpired,
    /// Bad signature, malformed payload, or wrong audience/issuer.
    TokenInvalid,
    /// Refresh token verified but no active, unexpired session matches it.
    SessionNotFound,
    /// Account is suspended.
    AccountSuspended,
    /// Account is banned.
    AccountBanned,
    /// Account is deactivated.
    AccountInactive,
    /// Token subject no longer exists in the user store.
    UserNotFound,
    /// No identity on a route that requires one.
    AuthRequired,
    /// Authenticated, but the role is not in the allow-list.
    InsufficientPermissions,
    /// Authenticated, but not the owner of the target resource.
    NotResourceOwner,
    /// A rate-limit window threshold was exceeded.
    RateLimitExceeded,
    /// The client IP is under a progressive lockout.
    IpBlocked,
    /// Input validation failed.
    Validation,
    /// The requested resource was not found.
    NotFound,
    /// A conflict occurred (duplicate email/username, etc.).
    Conflict,
    /// Password hashing or verification failed at the crypto layer.
    Hashing,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// An internal server error occurred.
    Internal,
    /// The service is temporarily unavailable.
    ServiceUnavailable,
}

impl ErrorKind {
    /// The machine-readable code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenInvalid => "TOKEN_INVALID",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::AccountSuspended => "ACCOUNT_SUSPENDED",
            Self::AccountBanned => "ACCOUNT_BANNED",
            Self::AccountInactive => "ACCOUNT_INACTIVE",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            Self::NotResourceOwner => "NOT_RESOURCE_OWNER",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::IpBlocked => "IP_TEMPORARILY_BLOCKED",
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Hashing => "HASHING_ERROR",
            Self::Database => "DATABASE_ERROR",
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::Internal => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }

    /// Whether failures of this kind are security events and should be
    /// logged under the `security` target rather than as ordinary errors.
    pub fn is_security_event(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::TokenExpired
                | Self::TokenInvalid
                | Self::SessionNotFound
                | Self::AccountSuspended
                | Self::AccountBanned
                | Self::AccountInactive
                | Self::AuthRequired
                | Self::InsufficientPermissions
                | Self::NotResourceOwner
                | Self::RateLimitExceeded
                | Self::IpBlocked
        )
    }

    /// Whether this kind is an infrastructure failure whose message must
    /// not reach clients.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Hashing | Self::Database | Self::Configuration | Self::Internal
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The unified application error used throughout Agora.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Seconds until the caller may retry (rate-limit responses only).
    pub retry_after_seconds: Option<u64>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after_seconds: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after_seconds: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach a retry-after hint to this error.
    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after_seconds = Some(seconds);
        self
    }

    /// Create an invalid-credentials error.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "Invalid email or password")
    }

    /// Create a token-expired error.
    pub fn token_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenExpired, message)
    }

    /// Create a token-invalid error.
    pub fn token_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenInvalid, message)
    }

    /// Create a session-not-found error.
    pub fn session_not_found() -> Self {
        Self::new(ErrorKind::SessionNotFound, "Session not found or revoked")
    }

    /// Create a user-not-found error.
    pub fn user_not_found() -> Self {
        Self::new(ErrorKind::UserNotFound, "User no longer exists")
    }

    /// Create an auth-required error.
    pub fn auth_required(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthRequired, message)
    }

    /// Create an insufficient-permissions error.
    pub fn insufficient_permissions(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientPermissions, message)
    }

    /// Create a not-resource-owner error.
    pub fn not_resource_owner(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotResourceOwner, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a hashing error.
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Hashing, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a service-unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            retry_after_seconds: self.retry_after_seconds,
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Internal,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Seconds until the caller may retry (rate-limit responses only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.kind {
            ErrorKind::InvalidCredentials
            | ErrorKind::TokenExpired
            | ErrorKind::TokenInvalid
            | ErrorKind::SessionNotFound
            | ErrorKind::UserNotFound
            | ErrorKind::AuthRequired => StatusCode::UNAUTHORIZED,
            ErrorKind::AccountSuspended
            | ErrorKind::AccountBanned
            | ErrorKind::AccountInactive
            | ErrorKind::InsufficientPermissions
            | ErrorKind::NotResourceOwner => StatusCode::FORBIDDEN,
            ErrorKind::RateLimitExceeded | ErrorKind::IpBlocked => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Hashing
            | ErrorKind::Database
            | ErrorKind::Configuration
            | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Infrastructure detail stays in the logs; clients get a generic
        // message. Security-relevant failures are logged under their own
        // target at a severity distinct from ordinary errors.
        let message = if self.kind.is_infrastructure() {
            tracing::error!(code = %self.kind, error = %self.message, "Internal server error");
            "An internal error occurred".to_string()
        } else {
            if self.kind.is_security_event() {
                tracing::warn!(
                    target: "security",
                    code = %self.kind,
                    message = %self.message,
                    "Security-relevant request failure"
                );
            }
            self.message.clone()
        };

        let body = ApiErrorResponse {
            error: self.kind.code().to_string(),
            message,
            retry_after: self.retry_after_seconds,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(seconds) = self.retry_after_seconds {
            if let Ok(value) = seconds.to_string().parse() {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
