//! User records and the inputs that create or change them.

use usersvc_core::{Email, UserId};

use crate::Role;

/// A persisted user record.
///
/// `password_hash` is always the encoder's output, never the plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
}

/// A validated record ready for its first save; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    pub email: Email,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
}

/// Registration candidate as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    /// Requested role; `None` means the default role.
    pub role: Option<String>,
}

impl NewUser {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: String::new(),
            role: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Partial profile change. Absent fields are left untouched; role cannot be
/// changed through this path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}
