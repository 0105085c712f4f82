use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::Validation;
use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

use crate::services::auth::claims::Claims;
use crate::services::auth::principal::{AuthenticatedPrincipal, Authority};
use crate::services::auth::signing_key::SigningKey;

/// Why a token could not be turned into claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token")]
    MalformedToken,
    #[error("token signature mismatch")]
    SignatureMismatch,
    #[error("token expired")]
    ExpiredToken,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::SignatureMismatch
            }
            ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
            _ => TokenError::MalformedToken,
        }
    }
}

/// Verifies access tokens against the process signing key.
///
/// jsonwebtoken checks the signature and the header `alg`; `exp` (milliseconds) is checked
/// here with no leeway.
#[derive(Clone, Debug)]
pub struct TokenValidator {
    key: Arc<SigningKey>,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(key: Arc<SigningKey>) -> Self {
        let mut validation = Validation::new(key.algorithm());
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::new();

        Self { key, validation }
    }

    pub fn extract_claims(&self, token: &str) -> Result<Claims, TokenError> {
        self.extract_claims_at(token, Utc::now())
    }

    pub fn extract_claims_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let data =
            jsonwebtoken::decode::<Claims>(token, self.key.decoding_key(), &self.validation)?;
        let claims = data.claims;

        if claims.is_expired_at(now.timestamp_millis()) {
            return Err(TokenError::ExpiredToken);
        }

        Ok(claims)
    }

    pub fn extract_identifier(&self, token: &str) -> Option<String> {
        self.extract_claims(token)
            .ok()
            .and_then(|c| c.identifier().map(str::to_string))
    }

    pub fn extract_role(&self, token: &str) -> Option<String> {
        self.extract_claims(token).ok().map(|c| c.role)
    }

    /// Exactly one authority (the role claim), or none for an invalid token.
    pub fn extract_authorities(&self, token: &str) -> Vec<Authority> {
        self.extract_claims(token)
            .map(|c| c.authorities())
            .unwrap_or_default()
    }

    /// True iff the token verifies, is unexpired, and its subject and role equal the
    /// principal's. Exact comparison: no trimming, no case folding.
    pub fn matches(&self, token: &str, principal: &AuthenticatedPrincipal) -> bool {
        self.extract_identifier(token).as_deref() == Some(principal.identifier.as_str())
            && self.extract_role(token).as_deref() == Some(principal.role.as_str())
    }
}
