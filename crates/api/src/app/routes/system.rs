use axum::{Extension, Json, http::StatusCode, response::IntoResponse};

use crate::context::AuthContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// How the current request was admitted.
pub async fn whoami(Extension(ctx): Extension<AuthContext>) -> impl IntoResponse {
    let interception = ctx.interception();
    Json(serde_json::json!({
        "authenticated": interception.is_authenticated(),
        "principal": interception.principal(),
        "bypass": interception.bypass.map(|b| b.as_str()),
    }))
}
