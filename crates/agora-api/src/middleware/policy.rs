//! Authorization gates: role, ownership, and account status.
//!
//! Handlers call these after the `AuthUser` extractor has attached an
//! identity. Looking up a resource's owner belongs to the owning data
//! model; the ownership gate only enforces the comparison.

use uuid::Uuid;

use agora_core::error::AppError;
use agora_entity::identity::Identity;
use agora_entity::user::UserRole;

/// Checks that an identity is present (optional-auth routes) and returns
/// it, failing with 401 otherwise.
pub fn require_identity(identity: Option<&Identity>) -> Result<&Identity, AppError> {
    identity.ok_or_else(|| AppError::auth_required("Authentication required"))
}

/// Checks the identity's role against an allow-list.
pub fn require_role(identity: &Identity, allowed: &[UserRole]) -> Result<(), AppError> {
    if allowed.contains(&identity.role) {
        Ok(())
    } else {
        Err(AppError::insufficient_permissions(format!(
            "Requires one of: {}",
            allowed
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}

/// Checks that the identity has the Admin role.
pub fn require_admin(identity: &Identity) -> Result<(), AppError> {
    if identity.role.is_admin() {
        Ok(())
    } else {
        Err(AppError::insufficient_permissions("Admin access required"))
    }
}

/// Checks that the identity has at least Moderator role.
pub fn require_moderator(identity: &Identity) -> Result<(), AppError> {
    if identity.role.is_moderator_or_above() {
        Ok(())
    } else {
        Err(AppError::insufficient_permissions(
            "Moderator or Admin access required",
        ))
    }
}

/// Checks that the identity owns the resource, or holds a role in the
/// moderation allow-list.
pub fn require_owner(identity: &Identity, owner_id: Uuid) -> Result<(), AppError> {
    if identity.id == owner_id || identity.role.is_moderator_or_above() {
        Ok(())
    } else {
        Err(AppError::not_resource_owner(
            "You do not own this resource",
        ))
    }
}
