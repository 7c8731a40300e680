//! `usersvc-core`: domain building blocks shared by the auth core and the API.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod email;
pub mod error;
pub mod id;

pub use email::Email;
pub use error::DomainError;
pub use id::UserId;
