use axum::{Router, routing::get};

pub mod auth;
pub mod common;
pub mod system;
pub mod user;

pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/whoami", get(system::whoami))
        .nest("/auth", auth::router())
        .nest("/user", user::router())
}
