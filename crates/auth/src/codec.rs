//! Signed token encoding/decoding (HS256 compact JWS).

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use thiserror::Error;

use crate::{Claims, Role};

/// Minimum decoded secret length accepted for HMAC-SHA256 (256 bits).
pub const MIN_SECRET_BYTES: usize = 32;

/// The signing secret is unusable, or a token could not be signed.
///
/// Raised at startup when the configured secret is bad; the service must not
/// start without a valid key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("signing secret is not configured")]
    MissingSecret,

    #[error("signing secret is not valid base64: {0}")]
    InvalidEncoding(String),

    #[error("signing secret is too short: {actual} bytes, at least {required} required")]
    TooShort { actual: usize, required: usize },

    #[error("failed to sign token: {0}")]
    Encode(String),
}

/// A presented token could not be decoded or did not verify.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidTokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not verify")]
    BadSignature,

    #[error("token is missing required claim '{0}'")]
    MissingClaim(String),

    #[error("token claims are invalid: {0}")]
    InvalidClaims(String),
}

impl From<jsonwebtoken::errors::Error> for InvalidTokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::BadSignature,
            ErrorKind::MissingRequiredClaim(claim) => Self::MissingClaim(claim.clone()),
            ErrorKind::Json(_) => Self::InvalidClaims(err.to_string()),
            _ => Self::Malformed,
        }
    }
}

/// Server-held HMAC key, decoded once at startup and read-only afterwards.
#[derive(Clone)]
pub struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    /// Decode a standard-alphabet base64 secret.
    pub fn from_base64(secret: &str) -> Result<Self, SigningError> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(SigningError::MissingSecret);
        }
        let bytes = STANDARD
            .decode(secret)
            .map_err(|e| SigningError::InvalidEncoding(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SigningError> {
        if bytes.is_empty() {
            return Err(SigningError::MissingSecret);
        }
        if bytes.len() < MIN_SECRET_BYTES {
            return Err(SigningError::TooShort {
                actual: bytes.len(),
                required: MIN_SECRET_BYTES,
            });
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        })
    }
}

impl core::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Issues and parses signed bearer tokens.
///
/// `parse` verifies signature and claim shape only. Expiry and subject binding
/// are checked by [`crate::TokenValidator`].
#[derive(Debug, Clone)]
pub struct TokenCodec {
    key: SigningKey,
    header: Header,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(key: SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            key,
            header: Header::new(Algorithm::HS256),
            validation,
        }
    }

    pub fn from_base64_secret(secret: &str) -> Result<Self, SigningError> {
        Ok(Self::new(SigningKey::from_base64(secret)?))
    }

    pub fn issue(&self, subject: &str, role: Role) -> Result<String, SigningError> {
        self.issue_at(subject, role, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, SigningError> {
        let claims = Claims::new(subject, role, now);
        let token = jsonwebtoken::encode(&self.header, &claims, &self.key.encoding)
            .map_err(|e| SigningError::Encode(e.to_string()))?;
        tracing::debug!(subject, %role, exp = claims.exp, "issued token");
        Ok(token)
    }

    pub fn parse(&self, token: &str) -> Result<Claims, InvalidTokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.key.decoding, &self.validation)?;
        Ok(data.claims)
    }
}
