/// Factory: build the token primitives and the request authenticator from `Config`.
use std::sync::Arc;

use chrono::Duration;

use crate::config::Config;
use crate::repos::CredentialStore;
use crate::services::auth::{
    BypassPaths, KeyManager, RequestAuthenticator, TokenIssuer, TokenValidator,
};

pub struct AuthServices {
    pub issuer: Arc<TokenIssuer>,
    pub authenticator: Arc<RequestAuthenticator>,
}

// The key is resolved here, eagerly, so the fallback decision is logged at startup.
pub fn build_auth_services(
    config: &Config,
    keys: &KeyManager,
    store: Arc<dyn CredentialStore>,
) -> AuthServices {
    let key = keys.resolve(config.jwt_secret.as_deref());

    let issuer = TokenIssuer::new(
        Arc::clone(&key),
        Duration::milliseconds(config.jwt_expiration_ms),
    );
    let validator = TokenValidator::new(key);
    let authenticator = RequestAuthenticator::new(
        validator,
        store,
        BypassPaths::new(config.bypass_paths.iter().cloned()),
    );

    AuthServices {
        issuer: Arc::new(issuer),
        authenticator: Arc::new(authenticator),
    }
}
