use thiserror::Error;
use usersvc_core::DomainError;

use crate::{HashingError, SigningError, StoreError};

/// Failures reported by registration, login and profile operations.
///
/// `InvalidCredentials` is the only login failure callers see, whatever the cause.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email is already registered")]
    DuplicateEmail,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("user not found")]
    NotFound,

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Hashing(#[from] HashingError),

    #[error("credential store failure: {0}")]
    Store(String),
}

impl AuthError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(_) => Self::DuplicateEmail,
            StoreError::NotFound(_) => Self::NotFound,
            StoreError::Unavailable(msg) => Self::Store(msg),
        }
    }
}

impl From<DomainError> for AuthError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::Validation(msg),
        }
    }
}
