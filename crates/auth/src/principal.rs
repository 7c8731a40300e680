use serde::Serialize;
use usersvc_core::{Email, UserId};

use crate::{Role, User};

/// Identity resolved for a single request after its token verified.
///
/// Carries no credential material and lives only as long as the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub email: Email,
    pub name: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn owns(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}
