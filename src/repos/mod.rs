pub mod credential_store;
pub mod error;
pub mod memory;
pub mod user_repo;

pub use credential_store::{CredentialStore, NewUser};
pub use error::RepoError;
pub use memory::InMemoryUserRepo;
pub use user_repo::PgUserRepo;
