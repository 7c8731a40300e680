use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use usersvc_auth::{AuthError, AuthzError};

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::InvalidCredentials => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid credentials",
        ),
        AuthError::DuplicateEmail => json_error(
            StatusCode::CONFLICT,
            "duplicate_email",
            "email already registered",
        ),
        AuthError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        AuthError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        AuthError::Signing(e) => internal_error(&e),
        AuthError::Hashing(e) => internal_error(&e),
        AuthError::Store(msg) => internal_error(&msg),
    }
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    match err {
        AuthzError::Unauthenticated => json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "authentication required",
        ),
        AuthzError::Forbidden(_) => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
    }
}

/// Log the cause and answer with an opaque 500.
pub fn internal_error(cause: &dyn std::fmt::Display) -> axum::response::Response {
    tracing::error!(error = %cause, "request failed");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "internal server error",
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
