//! Auth handlers — register, login, refresh, logout, me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use validator::Validate;

use agora_auth::store::UserStore;
use agora_core::error::AppError;

use crate::dto::request::{LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest};
use crate::dto::response::{MessageResponse, RefreshResponse, TokenPairResponse, UserResponse};
use crate::extractors::{AuthUser, ClientMeta};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    meta: ClientMeta,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenPairResponse>), AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let outcome = state
        .auth_service
        .register(
            &req.email,
            &req.username,
            &req.password,
            &meta.ip,
            meta.user_agent.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    meta: ClientMeta,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenPairResponse>, AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let outcome = state
        .auth_service
        .login(
            &req.email,
            &req.password,
            &meta.ip,
            meta.user_agent.as_deref(),
        )
        .await?;

    Ok(Json(outcome.into()))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    meta: ClientMeta,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    let outcome = state
        .auth_service
        .refresh(&req.refresh_token, &meta.ip, meta.user_agent.as_deref())
        .await?;

    Ok(Json(outcome.into()))
}

/// POST /api/auth/logout
///
/// Requires a valid access token; the body names the refresh token to
/// invalidate. Always succeeds from the caller's perspective.
pub async fn logout(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<LogoutRequest>,
) -> Json<MessageResponse> {
    state.auth_service.logout(&req.refresh_token).await;

    Json(MessageResponse {
        message: "Logged out".to_string(),
    })
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .users
        .find_by_id(auth.id)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    Ok(Json(UserResponse::from(&user)))
}
