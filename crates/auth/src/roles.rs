use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role granted to a user.
///
/// Serialized in upper case (`"ADMIN"`, `"PASSENGER"`), which is also the
/// form carried in the token's `role` claim.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    /// Assigned to every self-registered user.
    #[default]
    Passenger,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::Passenger];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Passenger => "PASSENGER",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownRole(trimmed.to_string()))
    }
}
