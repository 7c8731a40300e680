//! `usersvc-auth`: stateless bearer-token authentication core.
//!
//! This crate has no HTTP dependency. The API layer feeds it raw
//! header values and gets back an explicit per-request [`Interception`].

pub mod authenticator;
pub mod authorize;
pub mod claims;
pub mod codec;
pub mod error;
pub mod interceptor;
pub mod password;
pub mod policy;
pub mod principal;
pub mod profile;
pub mod roles;
pub mod store;
pub mod user;
pub mod validator;

pub use authenticator::Authenticator;
pub use authorize::{AuthzError, authorize_user_access, require_access, require_principal};
pub use claims::{Claims, TOKEN_TTL_SECS, TokenValidationError, validate_claims};
pub use codec::{InvalidTokenError, SigningError, SigningKey, TokenCodec};
pub use error::AuthError;
pub use interceptor::{
    AuthOutcome, BEARER_PREFIX, Interception, RequestCredentials, RequestInterceptor,
    UnauthenticatedReason,
};
pub use password::{Argon2PasswordEncoder, HashingError, PasswordEncoder};
pub use policy::{AccessPolicy, Bypass};
pub use principal::Principal;
pub use profile::ProfileService;
pub use roles::{Role, UnknownRole};
pub use store::{CredentialStore, InMemoryCredentialStore, StoreError};
pub use user::{NewUser, NewUserRecord, ProfileUpdate, User};
pub use validator::TokenValidator;
