//! Per-request authentication decision.
//!
//! The interceptor turns the raw `Authorization` value into either a resolved
//! [`Principal`] or an [`UnauthenticatedReason`]. It never fails: a bad token,
//! an unknown subject or a store outage all end as `Unauthenticated`, and the
//! request is forwarded regardless. Whether a route needs a principal is
//! decided later (see [`crate::authorize`]).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use usersvc_core::Email;

use crate::{AccessPolicy, Bypass, CredentialStore, Principal, TokenCodec, TokenValidator};

/// Exact, case-sensitive scheme prefix of the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Transport-agnostic view of the request fields the interceptor reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestCredentials<'a> {
    pub path: &'a str,
    /// Raw `Authorization` header value, if present and readable.
    pub authorization: Option<&'a str>,
    /// Raw value of the policy's trust header, if present and readable.
    pub source: Option<&'a str>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnauthenticatedReason {
    /// No `Authorization` header, or not a `Bearer ` one.
    MissingCredentials,
    /// Token did not decode or verify.
    InvalidToken,
    /// Token subject has no user record.
    UnknownSubject,
    /// The credential store could not be read.
    StoreUnavailable,
    /// Token decoded but failed validation (expired or subject mismatch).
    Rejected,
}

impl UnauthenticatedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing_credentials",
            Self::InvalidToken => "invalid_token",
            Self::UnknownSubject => "unknown_subject",
            Self::StoreUnavailable => "store_unavailable",
            Self::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(Principal),
    Unauthenticated(UnauthenticatedReason),
}

/// Result of intercepting one request. Request-scoped; never shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interception {
    pub outcome: AuthOutcome,
    pub bypass: Option<Bypass>,
}

impl Interception {
    pub fn unauthenticated(reason: UnauthenticatedReason) -> Self {
        Self {
            outcome: AuthOutcome::Unauthenticated(reason),
            bypass: None,
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        match &self.outcome {
            AuthOutcome::Authenticated(principal) => Some(principal),
            AuthOutcome::Unauthenticated(_) => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal().is_some()
    }

    /// A principal is attached or the request qualifies for a bypass.
    pub fn access_granted(&self) -> bool {
        self.is_authenticated() || self.bypass.is_some()
    }
}

pub struct RequestInterceptor {
    validator: TokenValidator,
    store: Arc<dyn CredentialStore>,
    policy: AccessPolicy,
}

impl RequestInterceptor {
    pub fn new(codec: Arc<TokenCodec>, store: Arc<dyn CredentialStore>, policy: AccessPolicy) -> Self {
        Self {
            validator: TokenValidator::new(codec),
            store,
            policy,
        }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn intercept(&self, request: &RequestCredentials<'_>) -> Interception {
        self.intercept_at(request, Utc::now())
    }

    pub fn intercept_at(&self, request: &RequestCredentials<'_>, now: DateTime<Utc>) -> Interception {
        let bypass = self.policy.bypass_for(request.path, request.source);
        let outcome = match self.authenticate(request.authorization, now) {
            Ok(principal) => {
                tracing::debug!(user_id = %principal.user_id, "request authenticated");
                AuthOutcome::Authenticated(principal)
            }
            Err(reason) => {
                tracing::debug!(
                    reason = reason.as_str(),
                    bypass = bypass.map(|b| b.as_str()),
                    "request unauthenticated"
                );
                AuthOutcome::Unauthenticated(reason)
            }
        };
        Interception { outcome, bypass }
    }

    fn authenticate(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Principal, UnauthenticatedReason> {
        let token = bearer_token(authorization).ok_or(UnauthenticatedReason::MissingCredentials)?;

        let subject = self
            .validator
            .extract_subject(token)
            .map_err(|_| UnauthenticatedReason::InvalidToken)?;
        let email = Email::parse(&subject).map_err(|_| UnauthenticatedReason::InvalidToken)?;

        let user = self
            .store
            .find_by_email(&email)
            .map_err(|e| {
                tracing::error!(error = %e, "credential store lookup failed during interception");
                UnauthenticatedReason::StoreUnavailable
            })?
            .ok_or(UnauthenticatedReason::UnknownSubject)?;

        if !self.validator.is_valid_at(token, user.email.as_str(), now) {
            return Err(UnauthenticatedReason::Rejected);
        }
        Ok(Principal::from(user))
    }
}

impl core::fmt::Debug for RequestInterceptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RequestInterceptor")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Token part of a `Bearer ` header.
///
/// Exactly one space follows the scheme and the token itself carries no
/// whitespace; anything else counts as no credentials.
pub fn bearer_token(authorization: Option<&str>) -> Option<&str> {
    let token = authorization?.strip_prefix(BEARER_PREFIX)?;
    (!token.is_empty() && !token.contains(char::is_whitespace)).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryCredentialStore, NewUserRecord, Role, StoreError, User};
    use chrono::{Duration, TimeZone};
    use usersvc_core::UserId;

    const SECRET: &str = "dGVzdC1zZWNyZXQtdGhhdC1pcy1hdC1sZWFzdC0zMi1ieXRlcy1sb25n";

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    struct Fixture {
        codec: Arc<TokenCodec>,
        store: Arc<InMemoryCredentialStore>,
        interceptor: RequestInterceptor,
        alice: User,
    }

    fn fixture() -> Fixture {
        let codec = Arc::new(TokenCodec::from_base64_secret(SECRET).unwrap());
        let store = Arc::new(InMemoryCredentialStore::new());
        let alice = store
            .insert(NewUserRecord {
                email: Email::parse("a@x.com").unwrap(),
                name: "Alice".to_string(),
                password_hash: "$unused".to_string(),
                role: Role::Admin,
            })
            .unwrap();
        let interceptor =
            RequestInterceptor::new(codec.clone(), store.clone(), AccessPolicy::default());
        Fixture {
            codec,
            store,
            interceptor,
            alice,
        }
    }

    fn request<'a>(path: &'a str, authorization: Option<&'a str>) -> RequestCredentials<'a> {
        RequestCredentials {
            path,
            authorization,
            source: None,
        }
    }

    #[test]
    fn valid_token_attaches_principal() {
        let f = fixture();
        let token = f.codec.issue_at("a@x.com", Role::Passenger, t0()).unwrap();
        let header = format!("Bearer {token}");

        let result = f
            .interceptor
            .intercept_at(&request("/user/profile", Some(&header)), t0());

        let principal = result.principal().expect("principal attached");
        assert_eq!(principal.user_id, f.alice.id);
        assert_eq!(principal.email.as_str(), "a@x.com");
        // Role comes from the current record, not the token.
        assert_eq!(principal.role, Role::Admin);
        assert!(result.access_granted());
        assert_eq!(result.bypass, None);
    }

    #[test]
    fn missing_header_is_unauthenticated() {
        let f = fixture();
        let result = f.interceptor.intercept(&request("/user/profile", None));
        assert_eq!(
            result,
            Interception::unauthenticated(UnauthenticatedReason::MissingCredentials)
        );
        assert!(!result.access_granted());
    }

    #[test]
    fn non_bearer_or_wrong_case_prefix_is_ignored() {
        let f = fixture();
        let token = f.codec.issue("a@x.com", Role::Passenger).unwrap();
        for header in [
            format!("bearer {token}"),
            format!("Basic {token}"),
            format!("Bearer{token}"),
            format!("Bearer  {token}"),
            format!("Bearer {token} "),
            token.clone(),
            "Bearer ".to_string(),
        ] {
            let result = f.interceptor.intercept(&request("/user/profile", Some(&header)));
            assert_eq!(
                result.outcome,
                AuthOutcome::Unauthenticated(UnauthenticatedReason::MissingCredentials),
                "header {header:?}"
            );
        }
    }

    #[test]
    fn garbage_token_is_unauthenticated() {
        let f = fixture();
        let result = f
            .interceptor
            .intercept(&request("/user/profile", Some("Bearer garbage")));
        assert_eq!(
            result.outcome,
            AuthOutcome::Unauthenticated(UnauthenticatedReason::InvalidToken)
        );
    }

    #[test]
    fn token_for_unknown_subject_is_unauthenticated() {
        let f = fixture();
        let token = f.codec.issue("ghost@x.com", Role::Admin).unwrap();
        let header = format!("Bearer {token}");
        let result = f.interceptor.intercept(&request("/user/profile", Some(&header)));
        assert_eq!(
            result.outcome,
            AuthOutcome::Unauthenticated(UnauthenticatedReason::UnknownSubject)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let f = fixture();
        let token = f.codec.issue_at("a@x.com", Role::Passenger, t0()).unwrap();
        let header = format!("Bearer {token}");
        let result = f.interceptor.intercept_at(
            &request("/user/profile", Some(&header)),
            t0() + Duration::seconds(3601),
        );
        assert_eq!(
            result.outcome,
            AuthOutcome::Unauthenticated(UnauthenticatedReason::Rejected)
        );
    }

    #[test]
    fn token_follows_email_changes() {
        let f = fixture();
        let token = f.codec.issue_at("a@x.com", Role::Passenger, t0()).unwrap();
        let header = format!("Bearer {token}");

        let mut moved = f.alice.clone();
        moved.email = Email::parse("new@x.com").unwrap();
        f.store.update(moved).unwrap();

        let result = f
            .interceptor
            .intercept_at(&request("/user/profile", Some(&header)), t0());
        assert_eq!(
            result.outcome,
            AuthOutcome::Unauthenticated(UnauthenticatedReason::UnknownSubject)
        );
    }

    #[test]
    fn bypass_is_reported_alongside_outcome() {
        let f = fixture();
        let public = f.interceptor.intercept(&request("/auth/login", None));
        assert_eq!(public.bypass, Some(Bypass::PublicPath));
        assert!(!public.is_authenticated());
        assert!(public.access_granted());

        let gateway = f.interceptor.intercept(&RequestCredentials {
            path: "/user/by-id/1",
            authorization: Some("Bearer garbage"),
            source: Some("Api-Gateway"),
        });
        assert_eq!(gateway.bypass, Some(Bypass::TrustedGateway));
        assert!(!gateway.is_authenticated());
        assert!(gateway.access_granted());
    }

    struct BrokenStore;

    impl CredentialStore for BrokenStore {
        fn find_by_email(&self, _email: &Email) -> Result<Option<User>, StoreError> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }

        fn find_by_id(&self, _id: UserId) -> Result<Option<User>, StoreError> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }

        fn insert(&self, _record: NewUserRecord) -> Result<User, StoreError> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }

        fn update(&self, _user: User) -> Result<User, StoreError> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }
    }

    #[test]
    fn store_failure_degrades_to_unauthenticated() {
        let codec = Arc::new(TokenCodec::from_base64_secret(SECRET).unwrap());
        let interceptor =
            RequestInterceptor::new(codec.clone(), Arc::new(BrokenStore), AccessPolicy::default());
        let token = codec.issue("a@x.com", Role::Passenger).unwrap();
        let header = format!("Bearer {token}");

        let result = interceptor.intercept(&request("/user/profile", Some(&header)));
        assert_eq!(
            result.outcome,
            AuthOutcome::Unauthenticated(UnauthenticatedReason::StoreUnavailable)
        );
    }

    #[test]
    fn bearer_token_extraction() {
        assert_eq!(bearer_token(Some("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("Bearer  abc ")), None);
        assert_eq!(bearer_token(Some("Bearer  abc")), None);
        assert_eq!(bearer_token(Some("Bearer abc ")), None);
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("bearer abc")), None);
        assert_eq!(bearer_token(None), None);
    }
}
