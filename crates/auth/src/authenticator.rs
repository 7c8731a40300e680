//! Registration and login: credentials in, verified identity and token out.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use usersvc_core::Email;

use crate::{
    AuthError, CredentialStore, NewUser, NewUserRecord, PasswordEncoder, Role, TokenCodec, User,
};

pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    passwords: Arc<dyn PasswordEncoder>,
    codec: Arc<TokenCodec>,
}

impl Authenticator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        passwords: Arc<dyn PasswordEncoder>,
        codec: Arc<TokenCodec>,
    ) -> Self {
        Self {
            store,
            passwords,
            codec,
        }
    }

    /// Validate, hash and persist a new user.
    ///
    /// Email uniqueness is left to the store; a collision comes back as
    /// [`AuthError::DuplicateEmail`].
    #[tracing::instrument(skip_all, fields(email = %candidate.email))]
    pub fn register(&self, candidate: NewUser) -> Result<User, AuthError> {
        let email = Email::parse(&candidate.email)?;
        let role = match candidate.role.as_deref() {
            None => Role::default(),
            Some(raw) => raw
                .parse::<Role>()
                .map_err(|e| AuthError::validation(e.to_string()))?,
        };
        if candidate.password.is_empty() {
            return Err(AuthError::validation("password cannot be empty"));
        }

        let password_hash = self.passwords.encode(&candidate.password)?;
        let user = self.store.insert(NewUserRecord {
            email,
            name: candidate.name.trim().to_string(),
            password_hash,
            role,
        })?;

        tracing::info!(user_id = %user.id, %role, "user registered");
        Ok(user)
    }

    /// Verify credentials and issue a token for the stored role.
    pub fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        self.login_at(email, password, Utc::now())
    }

    #[tracing::instrument(skip_all, fields(email = %email))]
    pub fn login_at(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let Ok(email) = Email::parse(email) else {
            tracing::warn!("login rejected: malformed email");
            return Err(AuthError::InvalidCredentials);
        };

        let Some(user) = self.store.find_by_email(&email)? else {
            tracing::warn!("login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        if !self.passwords.verify(password, &user.password_hash) {
            tracing::warn!(user_id = %user.id, "login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        // The role in the token is the one stored now, not the one read above.
        let Some(current) = self.store.find_by_email(&email)? else {
            tracing::warn!(user_id = %user.id, "login rejected: user vanished after verification");
            return Err(AuthError::InvalidCredentials);
        };

        let token = self.codec.issue_at(current.email.as_str(), current.role, now)?;
        tracing::info!(user_id = %current.id, "login succeeded");
        Ok(token)
    }
}

impl core::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Argon2PasswordEncoder, InMemoryCredentialStore, StoreError, TokenValidator,
    };
    use std::sync::Mutex;
    use usersvc_core::UserId;

    const SECRET: &str = "dGVzdC1zZWNyZXQtdGhhdC1pcy1hdC1sZWFzdC0zMi1ieXRlcy1sb25n";

    struct Fixture {
        store: Arc<InMemoryCredentialStore>,
        codec: Arc<TokenCodec>,
        auth: Authenticator,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryCredentialStore::new());
        let codec = Arc::new(TokenCodec::from_base64_secret(SECRET).unwrap());
        let auth = Authenticator::new(
            store.clone(),
            Arc::new(Argon2PasswordEncoder::new()),
            codec.clone(),
        );
        Fixture { store, codec, auth }
    }

    #[test]
    fn register_hashes_password_and_assigns_default_role() {
        let f = fixture();
        let user = f.auth.register(NewUser::new("a@x.com", "pw1")).unwrap();

        assert_eq!(user.id, UserId::new(1));
        assert_eq!(user.email.as_str(), "a@x.com");
        assert_eq!(user.role, Role::Passenger);
        assert_ne!(user.password_hash, "pw1");
        assert!(Argon2PasswordEncoder::new().verify("pw1", &user.password_hash));

        let stored = f.store.find_by_id(user.id).unwrap().unwrap();
        assert_eq!(stored, user);
    }

    #[test]
    fn register_accepts_known_role_and_rejects_unknown() {
        let f = fixture();
        let admin = f
            .auth
            .register(NewUser::new("root@x.com", "pw").with_role("ADMIN"))
            .unwrap();
        assert_eq!(admin.role, Role::Admin);

        let err = f
            .auth
            .register(NewUser::new("c@x.com", "pw").with_role("CAPTAIN"))
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(f.store.len().unwrap(), 1);
    }

    #[test]
    fn register_rejects_duplicate_and_malformed_input() {
        let f = fixture();
        f.auth.register(NewUser::new("a@x.com", "pw1")).unwrap();

        assert_eq!(
            f.auth.register(NewUser::new("A@x.com", "other")).unwrap_err(),
            AuthError::DuplicateEmail
        );
        assert!(matches!(
            f.auth.register(NewUser::new("not-an-email", "pw")).unwrap_err(),
            AuthError::Validation(_)
        ));
        assert!(matches!(
            f.auth.register(NewUser::new("e@x.com", "")).unwrap_err(),
            AuthError::Validation(_)
        ));
    }

    #[test]
    fn login_issues_token_for_stored_subject() {
        let f = fixture();
        f.auth
            .register(NewUser::new("a@x.com", "pw1").with_name("Alice"))
            .unwrap();

        let token = f.auth.login("a@x.com", "pw1").unwrap();
        let claims = f.codec.parse(&token).unwrap();
        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.role, Role::Passenger);
        assert!(TokenValidator::new(f.codec.clone()).is_valid(&token, "a@x.com"));
    }

    #[test]
    fn wrong_password_and_unknown_email_look_identical() {
        let f = fixture();
        f.auth.register(NewUser::new("a@x.com", "pw1")).unwrap();

        let wrong_password = f.auth.login("a@x.com", "wrong").unwrap_err();
        let unknown_email = f.auth.login("b@x.com", "pw1").unwrap_err();
        let malformed = f.auth.login("nope", "pw1").unwrap_err();

        assert_eq!(wrong_password, AuthError::InvalidCredentials);
        assert_eq!(wrong_password, unknown_email);
        assert_eq!(wrong_password, malformed);
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    /// Store whose record disappears after the first lookup.
    struct VanishingStore {
        user: Mutex<Option<User>>,
    }

    impl CredentialStore for VanishingStore {
        fn find_by_email(&self, _email: &Email) -> Result<Option<User>, StoreError> {
            Ok(self.user.lock().unwrap().take())
        }

        fn find_by_id(&self, _id: UserId) -> Result<Option<User>, StoreError> {
            Ok(None)
        }

        fn insert(&self, _record: NewUserRecord) -> Result<User, StoreError> {
            Err(StoreError::Unavailable("read-only".to_string()))
        }

        fn update(&self, _user: User) -> Result<User, StoreError> {
            Err(StoreError::Unavailable("read-only".to_string()))
        }
    }

    #[test]
    fn user_vanishing_mid_login_is_invalid_credentials() {
        let encoder = Argon2PasswordEncoder::new();
        let user = User {
            id: UserId::new(5),
            email: Email::parse("a@x.com").unwrap(),
            name: String::new(),
            password_hash: encoder.encode("pw1").unwrap(),
            role: Role::Passenger,
        };
        let auth = Authenticator::new(
            Arc::new(VanishingStore {
                user: Mutex::new(Some(user)),
            }),
            Arc::new(encoder),
            Arc::new(TokenCodec::from_base64_secret(SECRET).unwrap()),
        );

        assert_eq!(
            auth.login("a@x.com", "pw1").unwrap_err(),
            AuthError::InvalidCredentials
        );
    }
}
