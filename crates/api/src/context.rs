use usersvc_auth::{Bypass, Interception};

/// Authentication result for a request.
///
/// Inserted by the interception middleware on every request, whether or not a
/// principal was resolved. Handlers read it instead of any ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    interception: Interception,
}

impl AuthContext {
    pub fn new(interception: Interception) -> Self {
        Self { interception }
    }

    pub fn interception(&self) -> &Interception {
        &self.interception
    }

    pub fn from_trusted_gateway(&self) -> bool {
        self.interception.bypass == Some(Bypass::TrustedGateway)
    }
}
