use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::Header;
use tracing::error;

use crate::error::AppError;
use crate::services::auth::claims::Claims;
use crate::services::auth::principal::AuthenticatedPrincipal;
use crate::services::auth::signing_key::SigningKey;

/// Mints signed access tokens (compact JWS, HMAC) for authenticated principals.
#[derive(Clone, Debug)]
pub struct TokenIssuer {
    key: Arc<SigningKey>,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(key: Arc<SigningKey>, ttl: Duration) -> Self {
        Self { key, ttl }
    }

    /// Issue a token valid from `now` for `ttl` (a negative ttl yields an already expired token).
    pub fn issue(
        &self,
        principal: &AuthenticatedPrincipal,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let iat = now.timestamp_millis();
        let exp = iat.saturating_add(ttl.num_milliseconds());
        let claims = Claims::for_principal(principal, iat, exp);

        let mut header = Header::new(self.key.algorithm());
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, self.key.encoding_key()).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            AppError::Internal
        })
    }

    /// Issue a token starting now, with the configured ttl.
    pub fn issue_now(&self, principal: &AuthenticatedPrincipal) -> Result<String, AppError> {
        self.issue(principal, Utc::now(), self.ttl)
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::*;
    use crate::services::auth::principal::Role;

    fn principal() -> AuthenticatedPrincipal {
        AuthenticatedPrincipal {
            id: "u1".into(),
            identifier: "a@b.com".into(),
            name: Some("Alice".into()),
            password_hash: "hash".into(),
            role: Role::Seller,
        }
    }

    fn decode_segment(segment: &str) -> serde_json::Value {
        let bytes = URL_SAFE_NO_PAD.decode(segment).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn issues_three_segment_token_with_expected_claims() {
        let key = Arc::new(SigningKey::resolve(Some("01234567890123456789012345678901")));
        let issuer = TokenIssuer::new(key, Duration::milliseconds(3_600_000));
        let now = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();

        let token = issuer
            .issue(&principal(), now, Duration::milliseconds(3_600_000))
            .unwrap();
        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(segments.len(), 3);

        let header = decode_segment(segments[0]);
        assert_eq!(header["alg"], "HS256");
        assert_eq!(header["typ"], "JWT");

        let payload = decode_segment(segments[1]);
        assert_eq!(payload["sub"], "a@b.com");
        assert_eq!(payload["role"], "SELLER");
        assert_eq!(payload["userId"], "u1");
        assert_eq!(payload["iat"], 1_700_000_000_123i64);
        assert_eq!(payload["exp"], 1_700_003_600_123i64);
        // the password hash never leaves the store
        assert!(payload.get("password_hash").is_none());
    }

    #[test]
    fn header_algorithm_follows_key_strength() {
        for (len, alg) in [(32, "HS256"), (63, "HS384"), (64, "HS512")] {
            let secret = "k".repeat(len);
            let key = Arc::new(SigningKey::resolve(Some(&secret)));
            let issuer = TokenIssuer::new(key, Duration::hours(1));

            let token = issuer.issue_now(&principal()).unwrap();
            let header = decode_segment(token.split('.').next().unwrap());
            assert_eq!(header["alg"], alg, "{len}-byte secret");
        }
    }
}
