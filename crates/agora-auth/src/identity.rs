//! Live identity resolution for the request pipeline.

use std::sync::Arc;

use uuid::Uuid;

use agora_core::{AppError, AppResult};
use agora_entity::identity::Identity;

use crate::store::UserStore;

/// Resolves a token subject into a fresh [`Identity`] from the current
/// user record.
///
/// Every authorization gate goes through this single call instead of
/// issuing its own store queries, so a role change or ban is reflected on
/// the very next request even while older access tokens remain unexpired.
#[derive(Clone)]
pub struct IdentityResolver {
    users: Arc<dyn UserStore>,
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver").finish()
    }
}

impl IdentityResolver {
    /// Creates a resolver over the given user store.
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Fetches the current user record for a subject id.
    ///
    /// Fails with `UserNotFound` if the subject no longer exists; status
    /// enforcement is the caller's decision via
    /// [`Identity::require_active`].
    pub async fn resolve(&self, subject_id: Uuid) -> AppResult<Identity> {
        let user = self
            .users
            .find_by_id(subject_id)
            .await?
            .ok_or_else(AppError::user_not_found)?;

        Ok(Identity::from(&user))
    }
}
