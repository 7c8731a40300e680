//! Process configuration, read once at startup from the environment.

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;
use usersvc_auth::AccessPolicy;
use usersvc_auth::policy::{DEFAULT_TRUST_HEADER, DEFAULT_TRUSTED_GATEWAY};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a base64 secret of at least 32 bytes")]
    MissingSecret,

    #[error("invalid bind address {value:?}: {reason}")]
    InvalidBindAddr { value: String, reason: String },

    #[error("invalid trust header name {0:?}")]
    InvalidHeaderName(String),
}

#[derive(Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// Base64-encoded HMAC secret. Decoded and checked when the app is built.
    pub jwt_secret: String,
    pub trust_header: String,
    pub trusted_gateway: String,
}

impl ApiConfig {
    /// Defaults for everything except the signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: jwt_secret.into(),
            trust_header: DEFAULT_TRUST_HEADER.to_string(),
            trusted_gateway: DEFAULT_TRUSTED_GATEWAY.to_string(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source.
    ///
    /// `JWT_SECRET` is required; other unset or blank values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::MissingSecret)?;

        let raw_addr = get("USERSVC_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidBindAddr {
                value: raw_addr.clone(),
                reason: e.to_string(),
            })?;

        let trust_header = get("USERSVC_TRUST_HEADER")
            .map(|h| h.trim().to_string())
            .unwrap_or_else(|| DEFAULT_TRUST_HEADER.to_string());
        if HeaderName::from_bytes(trust_header.as_bytes()).is_err() {
            return Err(ConfigError::InvalidHeaderName(trust_header));
        }

        let trusted_gateway = get("USERSVC_TRUSTED_GATEWAY")
            .map(|g| g.trim().to_string())
            .unwrap_or_else(|| DEFAULT_TRUSTED_GATEWAY.to_string());

        Ok(Self {
            bind_addr,
            jwt_secret,
            trust_header,
            trusted_gateway,
        })
    }

    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::new(self.trust_header.clone(), self.trusted_gateway.clone())
    }
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("trust_header", &self.trust_header)
            .field("trusted_gateway", &self.trusted_gateway)
            .finish()
    }
}
