use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Role;

/// Lifetime of every issued token, in seconds.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// JWT claims model.
///
/// Timestamps are Unix seconds, as required by the JWT `iat`/`exp` claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email.
    pub sub: String,

    /// Role copied from the user record at issuance time.
    pub role: Role,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp (`iat + TOKEN_TTL_SECS`).
    pub exp: i64,
}

impl Claims {
    pub fn new(subject: impl Into<String>, role: Role, issued_at: DateTime<Utc>) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub: subject.into(),
            role,
            iat,
            exp: iat + TOKEN_TTL_SECS,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time claims against `now`.
///
/// Signature verification happens in the codec; this checks the claims only.
/// A token is live while `now` is strictly before `exp`.
pub fn validate_claims(claims: &Claims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now.timestamp() >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
