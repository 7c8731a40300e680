use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{InvalidTokenError, TokenCodec, validate_claims};

/// Fail-closed token checks on top of [`TokenCodec`].
///
/// `is_valid` never errors: every decode, signature, expiry or subject failure
/// is reported as `false`.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    codec: Arc<TokenCodec>,
}

impl TokenValidator {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    pub fn extract_subject(&self, token: &str) -> Result<String, InvalidTokenError> {
        Ok(self.codec.parse(token)?.sub)
    }

    pub fn is_valid(&self, token: &str, expected_subject: &str) -> bool {
        self.is_valid_at(token, expected_subject, Utc::now())
    }

    pub fn is_valid_at(&self, token: &str, expected_subject: &str, now: DateTime<Utc>) -> bool {
        let claims = match self.codec.parse(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "token failed to decode");
                return false;
            }
        };

        if claims.sub != expected_subject {
            tracing::debug!("token subject does not match presented identity");
            return false;
        }

        match validate_claims(&claims, now) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "token claims rejected");
                false
            }
        }
    }
}
