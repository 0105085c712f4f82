//! In-memory Credential Store (development mode and tests).
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repos::credential_store::{CredentialStore, NewUser};
use crate::repos::error::{RepoError, RepoResult};
use crate::services::auth::principal::AuthenticatedPrincipal;

#[derive(Clone, Debug, Default)]
pub struct InMemoryUserRepo {
    users: Arc<RwLock<HashMap<String, AuthenticatedPrincipal>>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryUserRepo {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> RepoResult<Option<AuthenticatedPrincipal>> {
        Ok(self.users.read().await.get(identifier).cloned())
    }

    async fn create(&self, user: NewUser) -> RepoResult<AuthenticatedPrincipal> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.identifier) {
            return Err(RepoError::Conflict);
        }

        let principal = AuthenticatedPrincipal {
            id: Uuid::new_v4().to_string(),
            identifier: user.identifier,
            name: Some(user.name),
            password_hash: user.password_hash,
            role: user.role,
        };
        users.insert(principal.identifier.clone(), principal.clone());
        Ok(principal)
    }
}
