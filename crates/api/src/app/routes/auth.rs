use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use usersvc_auth::{NewUser, Role};

use super::common::{json_body, run_blocking};
use crate::app::{
    dto,
    errors::json_error,
    services::AppServices,
};
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> Response {
    let body = match json_body(body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    if let Some(raw) = body.role.as_deref() {
        match raw.parse::<Role>() {
            Ok(role) if role != Role::default() && !ctx.from_trusted_gateway() => {
                tracing::warn!(%role, "self-registration with elevated role refused");
                return json_error(
                    StatusCode::FORBIDDEN,
                    "forbidden",
                    "role assignment requires the trusted gateway",
                );
            }
            Ok(_) => {}
            Err(e) => return json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
        }
    }

    let candidate = NewUser::from(body);
    match run_blocking(move || services.authenticator.register(candidate)).await {
        Ok(user) => (StatusCode::OK, Json(dto::UserResponse::from(user))).into_response(),
        Err(resp) => resp,
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> Response {
    let dto::LoginRequest { email, password } = match json_body(body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    match run_blocking(move || services.authenticator.login(&email, &password)).await {
        Ok(token) => (StatusCode::OK, Json(dto::TokenResponse { token })).into_response(),
        Err(resp) => resp,
    }
}
