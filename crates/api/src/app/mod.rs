//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: authenticator, profile service and interceptor around one store
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;
use usersvc_auth::SigningError;

use crate::config::ApiConfig;
use crate::{authz, middleware};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Fails only when the configured signing secret is unusable.
pub fn build_app(config: &ApiConfig) -> Result<Router, SigningError> {
    let services = AppServices::in_memory(&config.jwt_secret, config.access_policy())?;
    Ok(router_with(Arc::new(services)))
}

/// Router over already-wired services.
///
/// Layer order, outermost first: interception (always continues), service
/// handles, then the access guard.
pub fn router_with(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        interceptor: services.interceptor.clone(),
    };

    routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            ))
            .layer(Extension(services))
            .layer(axum::middleware::from_fn(authz::require_access)),
    )
}
