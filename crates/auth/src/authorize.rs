use thiserror::Error;
use usersvc_core::UserId;

use crate::{Bypass, Interception, Principal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(String),
}

/// Gate for every route: pass if a principal is attached or a bypass applies.
///
/// - No IO
/// - No panics
pub fn require_access(ctx: &Interception) -> Result<(), AuthzError> {
    if ctx.access_granted() {
        Ok(())
    } else {
        Err(AuthzError::Unauthenticated)
    }
}

/// The authenticated principal, for handlers that act on "the current user".
pub fn require_principal(ctx: &Interception) -> Result<&Principal, AuthzError> {
    ctx.principal().ok_or(AuthzError::Unauthenticated)
}

/// Access to one user's record.
///
/// Allowed for the trusted gateway, the record's owner, and admins.
pub fn authorize_user_access(ctx: &Interception, target: UserId) -> Result<(), AuthzError> {
    if ctx.bypass == Some(Bypass::TrustedGateway) {
        return Ok(());
    }

    let principal = require_principal(ctx)?;
    if principal.owns(target) || principal.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(format!(
            "user {} may not access user {}",
            principal.user_id, target
        )))
    }
}
