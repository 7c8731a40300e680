use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use usersvc_auth::ProfileUpdate;

use super::common::{json_body, parse_user_id, run_blocking};
use crate::app::{dto, errors::auth_error_to_response, services::AppServices};
use crate::authz::{authorize_user, current_principal};
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new()
        .route("/profile", get(profile))
        .route("/by-id/:id", get(get_user))
        .route("/update-profile/:id", put(update_profile))
}

/// The caller's own record, read fresh from the store.
pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> Response {
    let principal = match current_principal(&ctx) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match services.profiles.get_by_email(principal.email.as_str()) {
        Ok(user) => (StatusCode::OK, Json(dto::UserResponse::from(user))).into_response(),
        Err(e) => auth_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_user_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if let Err(resp) = authorize_user(&ctx, id) {
        return resp;
    }

    match services.profiles.get_by_id(id) {
        Ok(user) => (StatusCode::OK, Json(dto::UserResponse::from(user))).into_response(),
        Err(e) => auth_error_to_response(e),
    }
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateProfileRequest>, JsonRejection>,
) -> Response {
    let id = match parse_user_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if let Err(resp) = authorize_user(&ctx, id) {
        return resp;
    }
    let body = match json_body(body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    let update = ProfileUpdate::from(body);
    match run_blocking(move || services.profiles.update(id, update)).await {
        Ok(user) => (StatusCode::OK, Json(dto::UserResponse::from(user))).into_response(),
        Err(resp) => resp,
    }
}
