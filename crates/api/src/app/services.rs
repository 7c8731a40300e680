use std::sync::Arc;

use usersvc_auth::{
    AccessPolicy, Argon2PasswordEncoder, Authenticator, CredentialStore, InMemoryCredentialStore,
    PasswordEncoder, ProfileService, RequestInterceptor, SigningError, TokenCodec,
};

/// Shared handles for request handlers, built once at startup.
#[derive(Debug)]
pub struct AppServices {
    pub authenticator: Authenticator,
    pub profiles: ProfileService,
    pub interceptor: Arc<RequestInterceptor>,
}

impl AppServices {
    /// Wire the services around one credential store and one signing key.
    pub fn new(
        codec: Arc<TokenCodec>,
        store: Arc<dyn CredentialStore>,
        passwords: Arc<dyn PasswordEncoder>,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            authenticator: Authenticator::new(store.clone(), passwords.clone(), codec.clone()),
            profiles: ProfileService::new(store.clone(), passwords),
            interceptor: Arc::new(RequestInterceptor::new(codec, store, policy)),
        }
    }

    /// In-memory store and argon2 hashing; the secret must decode to a usable key.
    pub fn in_memory(jwt_secret: &str, policy: AccessPolicy) -> Result<Self, SigningError> {
        let codec = Arc::new(TokenCodec::from_base64_secret(jwt_secret)?);
        Ok(Self::new(
            codec,
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(Argon2PasswordEncoder::new()),
            policy,
        ))
    }
}
