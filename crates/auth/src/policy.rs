//! Which requests may proceed without an authenticated principal.
//!
//! Gateway trust is a deployment invariant: the trust header is only checked,
//! never authenticated. The service must sit behind an edge that strips or
//! overwrites that header on traffic from untrusted clients.

pub const DEFAULT_TRUST_HEADER: &str = "X-Source";
pub const DEFAULT_TRUSTED_GATEWAY: &str = "api-gateway";
pub const PUBLIC_PATHS: [&str; 3] = ["/auth/register", "/auth/login", "/health"];

/// Why a request was let through without a principal.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Bypass {
    /// The path is on the public allowlist.
    PublicPath,
    /// The trust header carried the gateway identifier.
    TrustedGateway,
}

impl Bypass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bypass::PublicPath => "public_path",
            Bypass::TrustedGateway => "trusted_gateway",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    trust_header: String,
    trusted_gateway: String,
}

impl AccessPolicy {
    pub fn new(trust_header: impl Into<String>, trusted_gateway: impl Into<String>) -> Self {
        Self {
            trust_header: trust_header.into(),
            trusted_gateway: trusted_gateway.into(),
        }
    }

    /// Name of the header inspected for the gateway identifier.
    pub fn trust_header(&self) -> &str {
        &self.trust_header
    }

    /// Exact match against the allowlist.
    pub fn is_public_path(&self, path: &str) -> bool {
        PUBLIC_PATHS.contains(&path)
    }

    /// Case-insensitive match of the trust header value.
    pub fn is_trusted_source(&self, source: Option<&str>) -> bool {
        source.is_some_and(|value| value.eq_ignore_ascii_case(&self.trusted_gateway))
    }

    /// Gateway trust wins over the allowlist so handlers of public paths can
    /// still tell gateway traffic apart.
    pub fn bypass_for(&self, path: &str, source: Option<&str>) -> Option<Bypass> {
        if self.is_trusted_source(source) {
            Some(Bypass::TrustedGateway)
        } else if self.is_public_path(path) {
            Some(Bypass::PublicPath)
        } else {
            None
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TRUST_HEADER, DEFAULT_TRUSTED_GATEWAY)
    }
}
