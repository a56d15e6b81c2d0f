//! Request-scoped authenticated identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agora_core::{AppError, AppResult};

use crate::user::{User, UserRole, UserStatus};

/// The resolved identity attached to a request after authorization.
///
/// Reconstructed fresh on every request from the current persisted user
/// record, never from token claims alone, so role and status changes take
/// effect immediately instead of at token expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Subject id.
    pub id: Uuid,
    /// Current role.
    pub role: UserRole,
    /// Current account status.
    pub status: UserStatus,
}

impl Identity {
    /// Require the account to be active, mapping each non-active status to
    /// its own distinguishable error. Status is only disclosed after the
    /// caller has otherwise proven identity.
    pub fn require_active(&self) -> AppResult<()> {
        match self.status {
            UserStatus::Active => Ok(()),
            UserStatus::Inactive => Err(AppError::new(
                agora_core::ErrorKind::AccountInactive,
                "Account is deactivated",
            )),
            UserStatus::Suspended => Err(AppError::new(
                agora_core::ErrorKind::AccountSuspended,
                "Account is suspended",
            )),
            UserStatus::Banned => Err(AppError::new(
                agora_core::ErrorKind::AccountBanned,
                "Account is banned",
            )),
        }
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            status: user.status,
        }
    }
}
