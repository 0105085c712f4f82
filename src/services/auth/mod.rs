pub mod authenticator;
pub mod claims;
pub mod factory;
pub mod principal;
pub mod security_context;
pub mod signing_key;
pub mod token_issuer;
pub mod token_validator;

pub use authenticator::{BypassPaths, Outcome, RequestAuthenticator};
pub use factory::build_auth_services;
pub use principal::{AuthenticatedPrincipal, Authority, Role};
pub use security_context::SecurityContext;
pub use signing_key::KeyManager;
pub use token_issuer::TokenIssuer;
pub use token_validator::TokenValidator;
