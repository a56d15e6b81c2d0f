//! Authentication service — registration, login, refresh, logout, and
//! bulk invalidation.
//!
//! From the client's perspective a session moves through:
//! Unauthenticated → Authenticated (access valid) → Authenticated (access
//! expired, refresh valid) → LoggedOut/Revoked. The session row is the
//! sole authority for the refresh leg: a cryptographically valid refresh
//! token whose session is gone is rejected.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use agora_core::{AppError, AppResult};
use agora_entity::identity::Identity;
use agora_entity::session::NewSession;
use agora_entity::user::{NewUser, User, UserRole};

use crate::password::{PasswordHasher, PasswordValidator};
use crate::store::{SessionStore, UserStore};
use crate::token::TokenCodec;

/// Tokens handed to a client after login or registration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TokenGrant {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Session backing the refresh token.
    pub session_id: Uuid,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Result of a successful login or registration.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Issued tokens.
    pub grant: TokenGrant,
    /// The authenticated user.
    pub user: User,
}

/// Result of a successful token refresh.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RefreshOutcome {
    /// Newly issued access token.
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Orchestrates credential verification, token issuance, and session
/// persistence. All collaborators are constructor-injected so tests can
/// swap in in-memory stores.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    codec: Arc<TokenCodec>,
    hasher: Arc<PasswordHasher>,
    validator: PasswordValidator,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService").finish()
    }
}

impl AuthService {
    /// Creates a new auth service with all required dependencies.
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        codec: Arc<TokenCodec>,
        hasher: Arc<PasswordHasher>,
        validator: PasswordValidator,
    ) -> Self {
        Self {
            users,
            sessions,
            codec,
            hasher,
            validator,
        }
    }

    /// Registers a new user and logs them in, returning a token grant.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
        ip_address: &str,
        user_agent: Option<&str>,
    ) -> AppResult<LoginOutcome> {
        self.validator.validate(password)?;
        let password_hash = self.hasher.hash(password)?;

        let user = self
            .users
            .create(NewUser {
                email: email.trim().to_lowercase(),
                username: username.trim().to_string(),
                password_hash,
                role: UserRole::User,
            })
            .await?;

        info!(user_id = %user.id, "User registered");

        let grant = self.issue_grant(&user, ip_address, user_agent).await?;
        Ok(LoginOutcome { grant, user })
    }

    /// Performs the login flow:
    ///
    /// 1. Look up the credential by normalized email
    /// 2. Verify the password
    /// 3. Check account status
    /// 4. Issue token pair and create the session
    ///
    /// Unknown email and wrong password produce the same error; status
    /// errors are distinguishable because identity is already proven.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ip_address: &str,
        user_agent: Option<&str>,
    ) -> AppResult<LoginOutcome> {
        let email = email.trim().to_lowercase();

        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                warn!(target: "security", ip = %ip_address, "Login attempt for unknown email");
                return Err(AppError::invalid_credentials());
            }
        };

        if !self.hasher.verify(password, &user.password_hash)? {
            warn!(
                target: "security",
                user_id = %user.id,
                ip = %ip_address,
                "Login attempt with wrong password"
            );
            return Err(AppError::invalid_credentials());
        }

        Identity::from(&user).require_active()?;

        let grant = self.issue_grant(&user, ip_address, user_agent).await?;

        if let Err(e) = self.users.update_last_login(user.id).await {
            warn!(user_id = %user.id, error = %e, "Failed to record last login");
        }

        info!(user_id = %user.id, session_id = %grant.session_id, "Login successful");

        Ok(LoginOutcome { grant, user })
    }

    /// Refreshes an access token using a valid refresh token.
    ///
    /// The session store is the source of truth: a structurally valid
    /// refresh token whose session was revoked or swept fails with
    /// `SessionNotFound` even before the token itself expires. The
    /// refresh token is not rotated here; the session keeps its original
    /// token for its whole lifetime.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        ip_address: &str,
        user_agent: Option<&str>,
    ) -> AppResult<RefreshOutcome> {
        let claims = self.codec.verify_refresh_token(refresh_token)?;

        let digest = token_digest(refresh_token);
        let session = match self.sessions.find_active_by_refresh_hash(&digest).await? {
            Some(session) => session,
            None => {
                warn!(
                    target: "security",
                    user_id = %claims.sub,
                    ip = %ip_address,
                    "Refresh attempt against a revoked or expired session"
                );
                return Err(AppError::session_not_found());
            }
        };

        // Re-check the live user record, not the claims from issuance
        // time, so bans and deactivations cut refresh off immediately.
        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(AppError::user_not_found)?;
        Identity::from(&user).require_active()?;

        let (access_token, _) = self.codec.issue_access_token(&user)?;

        if let Err(e) = self
            .sessions
            .touch(session.id, ip_address, user_agent)
            .await
        {
            warn!(session_id = %session.id, error = %e, "Failed to touch session metadata");
        }

        info!(user_id = %user.id, session_id = %session.id, "Access token refreshed");

        Ok(RefreshOutcome {
            access_token,
            expires_in: self.codec.access_ttl_seconds(),
        })
    }

    /// Invalidates the session behind a refresh token.
    ///
    /// Always appears to succeed, whatever the token's state, so the
    /// response does not leak whether a session existed.
    pub async fn logout(&self, refresh_token: &str) {
        let Ok(claims) = self.codec.verify_refresh_token(refresh_token) else {
            return;
        };

        let digest = token_digest(refresh_token);
        match self.sessions.find_active_by_refresh_hash(&digest).await {
            Ok(Some(session)) => {
                if let Err(e) = self.sessions.invalidate(session.id).await {
                    warn!(session_id = %session.id, error = %e, "Failed to invalidate session on logout");
                } else {
                    info!(user_id = %claims.sub, session_id = %session.id, "Logout completed");
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(user_id = %claims.sub, error = %e, "Session lookup failed during logout");
            }
        }
    }

    /// Invalidates every session a user holds ("log out everywhere").
    pub async fn invalidate_all_sessions(&self, user_id: Uuid) -> AppResult<u64> {
        let count = self.sessions.invalidate_all_for_user(user_id).await?;
        info!(user_id = %user_id, count, "Invalidated all sessions for user");
        Ok(count)
    }

    /// Invalidates a single session by id. Idempotent.
    pub async fn invalidate_session(&self, session_id: Uuid) -> AppResult<()> {
        self.sessions.invalidate(session_id).await
    }

    /// Changes a user's password and forces re-authentication everywhere.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(AppError::user_not_found)?;

        if !self.hasher.verify(current_password, &user.password_hash)? {
            warn!(
                target: "security",
                user_id = %user.id,
                "Password change attempt with wrong current password"
            );
            return Err(AppError::invalid_credentials());
        }

        self.validator
            .validate_not_same(current_password, new_password)?;
        self.validator.validate(new_password)?;

        let new_hash = self.hasher.hash(new_password)?;
        self.users.update_password(user.id, &new_hash).await?;

        let revoked = self.invalidate_all_sessions(user.id).await?;
        info!(user_id = %user.id, revoked, "Password changed");

        Ok(())
    }

    /// Deletes all expired or revoked sessions. Returns the count removed.
    pub async fn cleanup_expired_sessions(&self) -> AppResult<u64> {
        self.sessions.sweep_expired().await
    }

    /// Issues a token pair and records the backing session.
    ///
    /// The session insert and the refresh token form one logical unit: if
    /// the insert fails, the error aborts the whole flow and neither token
    /// reaches the client.
    async fn issue_grant(
        &self,
        user: &User,
        ip_address: &str,
        user_agent: Option<&str>,
    ) -> AppResult<TokenGrant> {
        let (access_token, _) = self.codec.issue_access_token(user)?;
        let (refresh_token, refresh_expires_at) = self.codec.issue_refresh_token(user.id)?;

        let session = self
            .sessions
            .create(NewSession {
                user_id: user.id,
                refresh_token_hash: token_digest(&refresh_token),
                ip_address: ip_address.to_string(),
                user_agent: user_agent.map(String::from),
                expires_at: refresh_expires_at,
            })
            .await?;

        Ok(TokenGrant {
            access_token,
            refresh_token,
            session_id: session.id,
            expires_in: self.codec.access_ttl_seconds(),
        })
    }
}

/// SHA-256 hex digest of a token. Sessions store this instead of the raw
/// token so a leaked database does not leak usable refresh tokens.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
