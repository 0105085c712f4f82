/*
 * Responsibility
 * - Meaning the Credential Store reports upward
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error("conflict")]
    Conflict,
    #[error("invalid stored value: {0}")]
    InvalidRow(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl RepoError {
    // unique_violation -> Conflict, anything else stays a db error
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e
            && dbe.code().as_deref() == Some("23505")
        {
            return RepoError::Conflict;
        }
        RepoError::Db(e)
    }
}
