//! User self-service handlers.

use axum::Json;
use axum::extract::State;
use validator::Validate;

use agora_core::error::AppError;

use crate::dto::request::ChangePasswordRequest;
use crate::dto::response::MessageResponse;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// PUT /api/users/me/password
///
/// Changing the password revokes every outstanding session; the client
/// must log in again.
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    state
        .auth_service
        .change_password(auth.id, &req.current_password, &req.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password changed; all sessions have been logged out".to_string(),
    }))
}
