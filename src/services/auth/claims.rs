use serde::{Deserialize, Serialize};

use crate::services::auth::principal::{AuthenticatedPrincipal, Authority};

/// Access token claims.
///
/// NOTE:
/// - `iat` / `exp` are epoch milliseconds, not the RFC 7519 seconds. Expiry is checked by
///   `TokenValidator`, not by jsonwebtoken.
/// - `userId` is also accepted as `id` when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    #[serde(rename = "userId", alias = "id")]
    pub user_id: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn for_principal(principal: &AuthenticatedPrincipal, iat: i64, exp: i64) -> Self {
        Self {
            sub: principal.identifier.clone(),
            role: principal.role.as_str().to_string(),
            user_id: principal.id.clone(),
            iat,
            exp,
        }
    }

    /// Subject, unless it is empty.
    pub fn identifier(&self) -> Option<&str> {
        if self.sub.is_empty() {
            None
        } else {
            Some(&self.sub)
        }
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.exp
    }

    /// The role claim as the one and only authority.
    pub fn authorities(&self) -> Vec<Authority> {
        vec![Authority::new(self.role.clone())]
    }
}
