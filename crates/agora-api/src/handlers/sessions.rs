//! Session self-service handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use agora_auth::store::SessionStore;
use agora_core::error::AppError;

use crate::dto::response::{CountResponse, MessageResponse, SessionResponse};
use crate::extractors::AuthUser;
use crate::middleware::policy;
use crate::state::AppState;

/// GET /api/sessions — the caller's active sessions.
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<SessionResponse>>, AppError> {
    let sessions = state.sessions.find_active_by_user(auth.id).await?;

    Ok(Json(sessions.iter().map(SessionResponse::from).collect()))
}

/// DELETE /api/sessions/{id} — revoke one session.
///
/// Sessions are owned resources: the owner may revoke their own, and
/// moderators or admins may revoke anyone's.
pub async fn revoke_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let session = state
        .sessions
        .find_by_id(session_id)
        .await?
        .ok_or_else(|| AppError::not_found("Session not found"))?;

    policy::require_owner(&auth, session.user_id)?;

    state.auth_service.invalidate_session(session.id).await?;

    Ok(Json(MessageResponse {
        message: "Session revoked".to_string(),
    }))
}

/// POST /api/sessions/revoke-all — log out everywhere.
pub async fn revoke_all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CountResponse>, AppError> {
    let count = state.auth_service.invalidate_all_sessions(auth.id).await?;

    Ok(Json(CountResponse { count }))
}
