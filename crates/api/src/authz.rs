//! API-side access guards.
//!
//! Route access is enforced once as a layer; record-level checks are made by
//! handlers before touching the profile service.

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use usersvc_auth::{
    AuthzError, Principal, authorize_user_access, require_access as check_access, require_principal,
};
use usersvc_core::UserId;

use crate::app::errors::{authz_error_to_response, json_error};
use crate::context::AuthContext;

/// Reject requests that are neither authenticated nor bypassed.
pub async fn require_access(req: Request, next: Next) -> Response {
    let Some(ctx) = req.extensions().get::<AuthContext>() else {
        tracing::error!("auth context missing; interception layer not installed");
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error");
    };

    if let Err(err) = check_access(ctx.interception()) {
        tracing::debug!("request rejected: no principal and no bypass");
        return authz_error_to_response(err);
    }

    next.run(req).await
}

/// The caller's principal, or a ready-made 401.
pub fn current_principal(ctx: &AuthContext) -> Result<&Principal, Response> {
    require_principal(ctx.interception()).map_err(authz_error_to_response)
}

/// Record-level guard for `/user/.../:id` routes.
pub fn authorize_user(ctx: &AuthContext, target: UserId) -> Result<(), Response> {
    authorize_user_access(ctx.interception(), target).map_err(|err| {
        if let AuthzError::Forbidden(reason) = &err {
            tracing::warn!(%reason, "record access denied");
        }
        authz_error_to_response(err)
    })
}
