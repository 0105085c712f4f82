/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 *   - credential store, password verifier, token issuer, request authenticator
 * - Cheap to clone (everything inside is Arc)
 */
use std::fmt;
use std::sync::Arc;

use crate::repos::CredentialStore;
use crate::services::auth::{RequestAuthenticator, TokenIssuer};
use crate::services::password::PasswordVerifier;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn CredentialStore>,
    pub passwords: Arc<dyn PasswordVerifier>,
    pub issuer: Arc<TokenIssuer>,
    pub authenticator: Arc<RequestAuthenticator>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("users", &self.users.backend_name())
            .field("issuer", &self.issuer)
            .field("authenticator", &self.authenticator)
            .finish()
    }
}

impl AppState {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        passwords: Arc<dyn PasswordVerifier>,
        issuer: Arc<TokenIssuer>,
        authenticator: Arc<RequestAuthenticator>,
    ) -> Self {
        Self {
            users,
            passwords,
            issuer,
            authenticator,
        }
    }
}
