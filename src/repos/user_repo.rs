/*
 * Responsibility
 * - users table access through SQLx (Postgres-backed Credential Store)
 * - DB errors are returned as RepoError (unique violation -> Conflict)
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::credential_store::{CredentialStore, NewUser};
use crate::repos::error::{RepoError, RepoResult};
use crate::services::auth::principal::{AuthenticatedPrincipal, Role};

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

impl TryFrom<UserRow> for AuthenticatedPrincipal {
    type Error = RepoError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        // The column only ever holds the canonical form.
        let role = match row.role.as_str() {
            "CLIENT" => Role::Client,
            "SELLER" => Role::Seller,
            other => return Err(RepoError::InvalidRow(format!("unknown role {other:?}"))),
        };

        Ok(AuthenticatedPrincipal {
            id: row.id.to_string(),
            identifier: row.email,
            name: row.name,
            password_hash: row.password_hash,
            role,
        })
    }
}

#[derive(Clone, Debug)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgUserRepo {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> RepoResult<Option<AuthenticatedPrincipal>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, role
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AuthenticatedPrincipal::try_from).transpose()
    }

    async fn create(&self, user: NewUser) -> RepoResult<AuthenticatedPrincipal> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, role
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.identifier)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        AuthenticatedPrincipal::try_from(row)
    }
}
