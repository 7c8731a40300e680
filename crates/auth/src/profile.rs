//! Profile lookups and partial updates.

use std::sync::Arc;

use usersvc_core::{Email, UserId};

use crate::{AuthError, CredentialStore, PasswordEncoder, ProfileUpdate, User};

pub struct ProfileService {
    store: Arc<dyn CredentialStore>,
    passwords: Arc<dyn PasswordEncoder>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn CredentialStore>, passwords: Arc<dyn PasswordEncoder>) -> Self {
        Self { store, passwords }
    }

    pub fn get_by_email(&self, email: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::NotFound)?;
        self.store.find_by_email(&email)?.ok_or(AuthError::NotFound)
    }

    pub fn get_by_id(&self, id: UserId) -> Result<User, AuthError> {
        self.store.find_by_id(id)?.ok_or(AuthError::NotFound)
    }

    /// Apply the fields present in `update` and save.
    ///
    /// Inputs are validated before anything is hashed or written, so a bad
    /// field leaves the record untouched.
    #[tracing::instrument(skip(self, update), fields(user_id = %id))]
    pub fn update(&self, id: UserId, update: ProfileUpdate) -> Result<User, AuthError> {
        let mut user = self.get_by_id(id)?;

        let name = update.name.map(|n| n.trim().to_string());
        if name.as_deref().is_some_and(str::is_empty) {
            return Err(AuthError::validation("name cannot be empty"));
        }
        let email = update.email.as_deref().map(Email::parse).transpose()?;
        if update.password.as_deref().is_some_and(str::is_empty) {
            return Err(AuthError::validation("password cannot be empty"));
        }

        if let Some(name) = name {
            user.name = name;
            tracing::debug!("name updated");
        }
        if let Some(email) = email {
            user.email = email;
            tracing::debug!("email updated");
        }
        if let Some(password) = update.password.as_deref() {
            user.password_hash = self.passwords.encode(password)?;
            tracing::debug!("password updated");
        }

        let saved = self.store.update(user)?;
        tracing::info!("profile updated");
        Ok(saved)
    }
}

impl core::fmt::Debug for ProfileService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProfileService").finish_non_exhaustive()
    }
}
