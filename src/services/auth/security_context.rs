use crate::services::auth::principal::{AuthenticatedPrincipal, Authority};

/// Request-scoped binding of a verified principal and its authorities.
///
/// Installed into the request extensions by the authentication filter (at most once per
/// request) and read by the `CurrentUser` / `MaybeUser` extractors.
#[derive(Debug, Clone)]
pub struct SecurityContext {
    pub principal: AuthenticatedPrincipal,
    pub authorities: Vec<Authority>,
}

impl SecurityContext {
    pub fn new(principal: AuthenticatedPrincipal, authorities: Vec<Authority>) -> Self {
        Self {
            principal,
            authorities,
        }
    }
}
