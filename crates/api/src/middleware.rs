use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use usersvc_auth::{RequestCredentials, RequestInterceptor};
use uuid::Uuid;

use crate::context::AuthContext;

#[derive(Clone)]
pub struct AuthState {
    pub interceptor: Arc<RequestInterceptor>,
}

/// Attach an [`AuthContext`] to every request and continue.
///
/// Never rejects: unauthenticated requests carry an unauthenticated context and
/// the access guard further in decides what to do with them.
pub async fn auth_middleware(State(state): State<AuthState>, mut req: Request, next: Next) -> Response {
    let span = tracing::info_span!(
        "request",
        request_id = %Uuid::now_v7(),
        method = %req.method(),
        path = %req.uri().path(),
    );

    let interception = {
        let _entered = span.enter();
        let headers = req.headers();
        let credentials = RequestCredentials {
            path: req.uri().path(),
            authorization: header_str(headers, header::AUTHORIZATION.as_str()),
            source: header_str(headers, state.interceptor.policy().trust_header()),
        };
        state.interceptor.intercept(&credentials)
    };

    req.extensions_mut().insert(AuthContext::new(interception));
    next.run(req).instrument(span).await
}

/// Header value as text; absent or non-visible-ASCII values read as `None`.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
