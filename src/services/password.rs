//! Password hashing / verification for the login and registration flow.
//!
//! The request filter never touches passwords.
use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(String);

pub trait PasswordVerifier: Send + Sync {
    fn hash(&self, raw: &str) -> Result<String, PasswordError>;

    // A stored hash that cannot be parsed verifies as false.
    fn verify(&self, raw: &str, stored_hash: &str) -> bool;
}

/// Argon2id with default parameters, PHC string format.
#[derive(Clone, Debug, Default)]
pub struct Argon2Passwords {
    argon2: Argon2<'static>,
}

impl Argon2Passwords {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordVerifier for Argon2Passwords {
    fn hash(&self, raw: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(raw.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordError(e.to_string()))
    }

    fn verify(&self, raw: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            return false;
        };
        self.argon2
            .verify_password(raw.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let passwords = Argon2Passwords::new();
        let hash = passwords.hash("s3cret!").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(passwords.verify("s3cret!", &hash));
        assert!(!passwords.verify("S3cret!", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let passwords = Argon2Passwords::new();
        assert_ne!(
            passwords.hash("same").unwrap(),
            passwords.hash("same").unwrap()
        );
    }

    #[test]
    fn unparseable_stored_hash_never_verifies() {
        let passwords = Argon2Passwords::new();
        assert!(!passwords.verify("anything", "not-a-phc-string"));
        assert!(!passwords.verify("", ""));
    }
}
