//! Per-request authentication decision.
//!
//! `RequestAuthenticator::authenticate` turns (path, Authorization header) into an
//! [`Outcome`]. It never fails: every problem becomes `Anonymous` or `Rejected(reason)`, and the
//! middleware forwards the request in all cases. Rejecting unauthenticated requests is left to
//! the handlers (extractors).

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use axum::http::HeaderValue;
use tracing::{debug, error};

use crate::repos::CredentialStore;
use crate::services::auth::security_context::SecurityContext;
use crate::services::auth::token_validator::{TokenError, TokenValidator};

const BEARER_PREFIX: &str = "Bearer ";

/// Exact-match set of request paths that skip authentication.
#[derive(Debug, Clone, Default)]
pub struct BypassPaths(HashSet<String>);

impl BypassPaths {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(paths.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }
}

/// Why a bearer token did not produce a security context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    MalformedHeader,
    Token(TokenError),
    PrincipalNotFound,
    ClaimMismatch,
    StoreUnavailable,
}

impl fmt::Display for AuthRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthRejection::MalformedHeader => {
                write!(f, "authorization header is not a bearer token")
            }
            AuthRejection::Token(e) => write!(f, "{}", e),
            AuthRejection::PrincipalNotFound => write!(f, "principal not found"),
            AuthRejection::ClaimMismatch => write!(f, "token claims do not match principal"),
            AuthRejection::StoreUnavailable => write!(f, "credential store unavailable"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Outcome {
    /// Path is in the bypass list; nothing was inspected.
    Bypassed,
    /// No Authorization header.
    Anonymous,
    /// A security context was already installed for this request.
    AlreadyAuthenticated,
    Authenticated(SecurityContext),
    Rejected(AuthRejection),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Bypassed => "bypassed",
            Outcome::Anonymous => "anonymous",
            Outcome::AlreadyAuthenticated => "already_authenticated",
            Outcome::Authenticated(_) => "authenticated",
            Outcome::Rejected(_) => "rejected",
        }
    }
}

pub struct RequestAuthenticator {
    validator: TokenValidator,
    store: Arc<dyn CredentialStore>,
    bypass: BypassPaths,
}

impl fmt::Debug for RequestAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestAuthenticator")
            .field("store", &self.store.backend_name())
            .field("bypass", &self.bypass)
            .finish()
    }
}

impl RequestAuthenticator {
    pub fn new(
        validator: TokenValidator,
        store: Arc<dyn CredentialStore>,
        bypass: BypassPaths,
    ) -> Self {
        Self {
            validator,
            store,
            bypass,
        }
    }

    pub fn is_bypassed(&self, path: &str) -> bool {
        self.bypass.contains(path)
    }

    /// Decide the authentication outcome for one request.
    ///
    /// The Credential Store lookup is the only suspension point. If the caller drops this
    /// future, no context exists to install.
    pub async fn authenticate(
        &self,
        path: &str,
        authorization: Option<&HeaderValue>,
        has_context: bool,
    ) -> Outcome {
        if self.is_bypassed(path) {
            return Outcome::Bypassed;
        }

        let Some(header) = authorization else {
            return Outcome::Anonymous;
        };

        let Some(token) = bearer_token(header) else {
            return Outcome::Rejected(AuthRejection::MalformedHeader);
        };

        if has_context {
            return Outcome::AlreadyAuthenticated;
        }

        match self.validate(token).await {
            Ok(ctx) => Outcome::Authenticated(ctx),
            Err(reason) => Outcome::Rejected(reason),
        }
    }

    async fn validate(&self, token: &str) -> Result<SecurityContext, AuthRejection> {
        let claims = self
            .validator
            .extract_claims(token)
            .map_err(AuthRejection::Token)?;

        let identifier = claims
            .identifier()
            .ok_or(AuthRejection::Token(TokenError::MalformedToken))?;

        // A failed lookup is treated like a missing principal (no retry).
        let principal = self
            .store
            .find_by_identifier(identifier)
            .await
            .map_err(|e| {
                error!(
                    backend = self.store.backend_name(),
                    error = %e,
                    "credential store lookup failed"
                );
                AuthRejection::StoreUnavailable
            })?
            .ok_or(AuthRejection::PrincipalNotFound)?;

        if !self.validator.matches(token, &principal) {
            debug!(identifier, "token claims do not match stored principal");
            return Err(AuthRejection::ClaimMismatch);
        }

        let authorities = self.validator.extract_authorities(token);
        Ok(SecurityContext::new(principal, authorities))
    }
}

fn bearer_token(header: &HeaderValue) -> Option<&str> {
    header.to_str().ok()?.strip_prefix(BEARER_PREFIX)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{Duration, Utc};

    use super::*;
    use crate::repos::error::{RepoError, RepoResult};
    use crate::repos::{InMemoryUserRepo, NewUser};
    use crate::services::auth::principal::{AuthenticatedPrincipal, Authority, Role};
    use crate::services::auth::signing_key::SigningKey;
    use crate::services::auth::token_issuer::TokenIssuer;

    const SECRET: &str = "01234567890123456789012345678901";

    /// Counts lookups; optionally fails every call.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryUserRepo,
        lookups: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl CredentialStore for CountingStore {
        fn backend_name(&self) -> &'static str {
            "counting"
        }

        async fn find_by_identifier(
            &self,
            identifier: &str,
        ) -> RepoResult<Option<AuthenticatedPrincipal>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RepoError::InvalidRow("boom".into()));
            }
            self.inner.find_by_identifier(identifier).await
        }

        async fn create(&self, user: NewUser) -> RepoResult<AuthenticatedPrincipal> {
            self.inner.create(user).await
        }
    }

    struct Fixture {
        store: Arc<CountingStore>,
        issuer: TokenIssuer,
        auth: RequestAuthenticator,
    }

    impl Fixture {
        fn new(fail: bool) -> Self {
            let key = Arc::new(SigningKey::resolve(Some(SECRET)));
            let store = Arc::new(CountingStore {
                fail,
                ..Default::default()
            });
            let auth = RequestAuthenticator::new(
                TokenValidator::new(Arc::clone(&key)),
                store.clone(),
                BypassPaths::new(["/api/v1/auth/login", "/api/v1/auth/register"]),
            );
            Self {
                store,
                issuer: TokenIssuer::new(key, Duration::hours(1)),
                auth,
            }
        }

        async fn user(&self, email: &str, role: Role) -> AuthenticatedPrincipal {
            self.store
                .create(NewUser {
                    name: "Alice".into(),
                    identifier: email.into(),
                    password_hash: "hash".into(),
                    role,
                })
                .await
                .unwrap()
        }

        fn bearer(&self, principal: &AuthenticatedPrincipal) -> HeaderValue {
            let token = self.issuer.issue_now(principal).unwrap();
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
        }

        fn lookups(&self) -> usize {
            self.store.lookups.load(Ordering::SeqCst)
        }

        async fn call(&self, header: Option<&HeaderValue>) -> Outcome {
            self.auth.authenticate("/x", header, false).await
        }
    }

    fn rejection(outcome: Outcome) -> Option<AuthRejection> {
        match outcome {
            Outcome::Rejected(reason) => Some(reason),
            _ => None,
        }
    }

    #[tokio::test]
    async fn bypass_paths_never_reach_the_store() {
        let fx = Fixture::new(false);
        let p = fx.user("a@b.com", Role::Client).await;
        let headers = [
            Some(fx.bearer(&p)),
            Some(HeaderValue::from_static("Bearer garbage")),
            Some(HeaderValue::from_static("Basic xyz")),
            None,
        ];

        for header in &headers {
            let outcome = fx
                .auth
                .authenticate("/api/v1/auth/login", header.as_ref(), false)
                .await;
            assert!(matches!(outcome, Outcome::Bypassed));
        }
        assert_eq!(fx.lookups(), 0);
    }

    #[tokio::test]
    async fn bypass_match_is_exact() {
        let fx = Fixture::new(false);
        for path in ["/api/v1/auth/login/", "/api/v1/auth/LOGIN", "/api/v1/auth"] {
            assert!(!fx.auth.is_bypassed(path), "{path}");
        }
    }

    #[tokio::test]
    async fn missing_header_is_anonymous() {
        let fx = Fixture::new(false);
        let outcome = fx.auth.authenticate("/api/v1/users/me", None, false).await;
        assert!(matches!(outcome, Outcome::Anonymous));
        assert_eq!(fx.lookups(), 0);
    }

    #[tokio::test]
    async fn non_bearer_headers_are_malformed() {
        let fx = Fixture::new(false);
        let headers = [
            HeaderValue::from_static("Basic xyz"),
            HeaderValue::from_static("bearer abc"),
            HeaderValue::from_static("Bearer"),
            HeaderValue::from_bytes(b"Bearer \xff").unwrap(),
        ];
        for header in &headers {
            let outcome = fx.call(Some(header)).await;
            assert_eq!(
                rejection(outcome),
                Some(AuthRejection::MalformedHeader),
                "{header:?}"
            );
        }
        assert_eq!(fx.lookups(), 0);
    }

    #[tokio::test]
    async fn valid_token_authenticates() {
        let fx = Fixture::new(false);
        let p = fx.user("a@b.com", Role::Client).await;

        let outcome = fx
            .auth
            .authenticate("/api/v1/users/me", Some(&fx.bearer(&p)), false)
            .await;
        let Outcome::Authenticated(ctx) = outcome else {
            panic!("expected authenticated, got {outcome:?}");
        };
        assert_eq!(ctx.principal, p);
        assert_eq!(ctx.authorities, vec![Authority::new("CLIENT")]);
        assert_eq!(fx.lookups(), 1);
    }

    #[tokio::test]
    async fn existing_context_is_not_replaced() {
        let fx = Fixture::new(false);
        let p = fx.user("a@b.com", Role::Client).await;

        let header = fx.bearer(&p);
        let outcome = fx.auth.authenticate("/x", Some(&header), true).await;
        assert!(matches!(outcome, Outcome::AlreadyAuthenticated));
        assert_eq!(fx.lookups(), 0);
    }

    #[tokio::test]
    async fn empty_bearer_token_is_rejected_as_malformed_token() {
        let fx = Fixture::new(false);
        let header = HeaderValue::from_static("Bearer ");
        let outcome = fx.call(Some(&header)).await;
        assert_eq!(
            rejection(outcome),
            Some(AuthRejection::Token(TokenError::MalformedToken))
        );
    }

    #[tokio::test]
    async fn expired_token_is_rejected_before_lookup() {
        let fx = Fixture::new(false);
        let p = fx.user("a@b.com", Role::Client).await;
        let token = fx
            .issuer
            .issue(&p, Utc::now(), Duration::milliseconds(-1))
            .unwrap();
        let header = HeaderValue::from_str(&format!("Bearer {token}")).unwrap();

        let outcome = fx.call(Some(&header)).await;
        assert_eq!(
            rejection(outcome),
            Some(AuthRejection::Token(TokenError::ExpiredToken))
        );
        assert_eq!(fx.lookups(), 0);
    }

    #[tokio::test]
    async fn unknown_principal_is_rejected() {
        let fx = Fixture::new(false);
        let ghost = AuthenticatedPrincipal {
            id: "u0".into(),
            identifier: "ghost@b.com".into(),
            name: None,
            password_hash: String::new(),
            role: Role::Client,
        };

        let outcome = fx.call(Some(&fx.bearer(&ghost))).await;
        assert_eq!(rejection(outcome), Some(AuthRejection::PrincipalNotFound));
        assert_eq!(fx.lookups(), 1);
    }

    #[tokio::test]
    async fn role_change_since_issue_is_a_claim_mismatch() {
        let fx = Fixture::new(false);
        let stored = fx.user("a@b.com", Role::Seller).await;
        let stale = AuthenticatedPrincipal {
            role: Role::Client,
            ..stored
        };

        let outcome = fx.call(Some(&fx.bearer(&stale))).await;
        assert_eq!(rejection(outcome), Some(AuthRejection::ClaimMismatch));
    }

    #[tokio::test]
    async fn store_failure_degrades_to_rejection() {
        let fx = Fixture::new(true);
        let p = AuthenticatedPrincipal {
            id: "u1".into(),
            identifier: "a@b.com".into(),
            name: None,
            password_hash: String::new(),
            role: Role::Client,
        };

        let outcome = fx.call(Some(&fx.bearer(&p))).await;
        assert_eq!(rejection(outcome), Some(AuthRejection::StoreUnavailable));
    }
}
