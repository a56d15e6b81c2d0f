//! Admin-only session management handlers.

use axum::Json;
use axum::extract::{Path, State};
use tracing::info;
use uuid::Uuid;

use agora_auth::store::SessionStore;
use agora_core::error::AppError;

use crate::dto::response::{CountResponse, SessionResponse};
use crate::extractors::AuthUser;
use crate::middleware::policy;
use crate::state::AppState;

/// GET /api/admin/sessions — all active sessions.
pub async fn list_all_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<SessionResponse>>, AppError> {
    policy::require_admin(&auth)?;

    let sessions = state.sessions.find_all_active().await?;

    Ok(Json(sessions.iter().map(SessionResponse::from).collect()))
}

/// POST /api/admin/users/{id}/sessions/revoke — force de-auth of a user.
pub async fn revoke_user_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<CountResponse>, AppError> {
    policy::require_admin(&auth)?;

    let count = state.auth_service.invalidate_all_sessions(user_id).await?;

    info!(
        admin_id = %auth.id,
        user_id = %user_id,
        count,
        "Admin revoked user sessions"
    );

    Ok(Json(CountResponse { count }))
}

/// POST /api/admin/sessions/cleanup — sweep expired/revoked sessions.
///
/// Returns the removed count for observability; zero rows is still a
/// success.
pub async fn cleanup_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CountResponse>, AppError> {
    policy::require_admin(&auth)?;

    let count = state.auth_service.cleanup_expired_sessions().await?;

    Ok(Json(CountResponse { count }))
}
