//! Credential Store interface.
//!
//! The request filter only needs `find_by_identifier`; registration uses `create`.
//! Implementations must be cheap to share (`Arc<dyn CredentialStore>`).
use async_trait::async_trait;

use crate::repos::error::RepoResult;
use crate::services::auth::principal::{AuthenticatedPrincipal, Role};

/// Input for creating a principal. `password_hash` is already hashed.
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub identifier: String,
    pub password_hash: String,
    pub role: Role,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    // Returns the backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Look up a principal by its unique identifier (email). Exact match.
    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> RepoResult<Option<AuthenticatedPrincipal>>;

    // Create a principal. Returns `RepoError::Conflict` if the identifier is taken.
    async fn create(&self, user: NewUser) -> RepoResult<AuthenticatedPrincipal>;
}
