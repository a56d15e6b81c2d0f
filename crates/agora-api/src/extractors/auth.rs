//! `AuthUser` extractor — pulls the bearer token from the Authorization
//! header, verifies it, and re-checks live user state before attaching an
//! identity to the request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use agora_core::error::AppError;
use agora_entity::identity::Identity;

use crate::state::AppState;

/// Extracted authenticated identity, available in handlers.
///
/// Verification order matters: token signature/expiry first (an expired
/// token surfaces as `TOKEN_EXPIRED` so clients know to refresh rather
/// than re-login), then a live lookup of the user record. The lookup is
/// what makes bans and deactivations effective immediately instead of at
/// token expiry.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl std::ops::Deref for AuthUser {
    type Target = Identity;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| AppError::auth_required("Missing Authorization header"))?;

        let claims = state.token_codec.verify_access_token(&token)?;

        let identity = state.identity_resolver.resolve(claims.sub).await?;
        identity.require_active()?;

        Ok(AuthUser(identity))
    }
}

/// Like [`AuthUser`] but for optional-auth routes: a missing header is
/// simply "no identity", while a present-but-invalid token still fails.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<Identity>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts)? else {
            return Ok(MaybeAuthUser(None));
        };

        let claims = state.token_codec.verify_access_token(&token)?;

        let identity = state.identity_resolver.resolve(claims.sub).await?;
        identity.require_active()?;

        Ok(MaybeAuthUser(Some(identity)))
    }
}

/// Pull the bearer token out of the Authorization header, if present.
fn bearer_token(parts: &Parts) -> Result<Option<String>, AppError> {
    let Some(header) = parts.headers.get("authorization") else {
        return Ok(None);
    };

    let header = header
        .to_str()
        .map_err(|_| AppError::auth_required("Invalid Authorization header"))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::auth_required("Invalid Authorization header format"))?;

    Ok(Some(token.to_string()))
}
