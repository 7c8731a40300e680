use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::response::Response;
use usersvc_auth::AuthError;
use usersvc_core::UserId;

use crate::app::errors::{auth_error_to_response, internal_error, json_error};

/// Run password hashing and store work off the async workers.
pub async fn run_blocking<T, F>(work: F) -> Result<T, Response>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(auth_error_to_response),
        Err(join) => Err(internal_error(&join)),
    }
}

pub fn parse_user_id(raw: &str) -> Result<UserId, Response> {
    raw.parse::<UserId>().map_err(|e| {
        json_error(
            axum::http::StatusCode::BAD_REQUEST,
            "invalid_id",
            e.to_string(),
        )
    })
}

/// Unwrap a JSON body, answering malformed or mistyped bodies in the usual
/// error shape instead of axum's plain-text rejection.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(json_error(
            rejection.status(),
            "invalid_body",
            rejection.body_text(),
        )),
    }
}
