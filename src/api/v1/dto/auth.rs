/*
 * Responsibility
 * - request/response DTOs for the /auth routes
 * - validate() does shape checks only; credentials are checked by the handler
 */
use serde::{Deserialize, Serialize};

use crate::services::auth::{AuthenticatedPrincipal, Role};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.email.trim().is_empty() {
            return Err("email is required");
        }
        if self.password.is_empty() {
            return Err("password is required");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl RegisterRequest {
    /// Returns the parsed role on success.
    pub fn validate(&self) -> Result<Role, &'static str> {
        let name_len = self.name.trim().chars().count();
        if !(3..=100).contains(&name_len) {
            return Err("name must be 3 to 100 characters");
        }
        let email_len = self.email.trim().chars().count();
        if !(6..=100).contains(&email_len) {
            return Err("email must be 6 to 100 characters");
        }
        if self.password.chars().count() < 6 {
            return Err("password must be at least 6 characters");
        }
        Role::from_name(&self.role)
            .ok_or("role must be SELLER or CLIENT")
    }
}

#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
}

impl From<&AuthenticatedPrincipal> for RegisteredUser {
    fn from(p: &AuthenticatedPrincipal) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            email: p.identifier.clone(),
            role: p.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub response: RegisteredUser,
}

#[derive(Debug, Serialize)]
pub struct CheckTokenResponse {
    pub valid: bool,
    pub message: &'static str,
}

impl CheckTokenResponse {
    pub fn new(valid: bool) -> Self {
        let message = if valid {
            "Valid token"
        } else {
            "Invalid token"
        };
        Self { valid, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(name: &str, email: &str, password: &str, role: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role: role.into(),
        }
    }

    #[test]
    fn register_validation() {
        assert_eq!(
            register("Alice", "a@b.com", "secret", "seller").validate(),
            Ok(Role::Seller)
        );
        for bad in [
            register("Al", "a@b.com", "secret", "client"),
            register("Alice", "a@b.c", "secret", "client"),
            register("Alice", "a@b.com", "12345", "client"),
        ] {
            assert!(bad.validate().is_err(), "{}", bad.email);
        }
        assert_eq!(
            register("Alice", "a@b.com", "secret", "admin").validate(),
            Err("role must be SELLER or CLIENT")
        );
    }

    #[test]
    fn login_validation() {
        let ok = LoginRequest {
            email: "a@b.com".into(),
            password: "x".into(),
        };
        assert!(ok.validate().is_ok());

        let blank = LoginRequest {
            email: " ".into(),
            password: "x".into(),
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn check_token_messages() {
        assert_eq!(CheckTokenResponse::new(true).message, "Valid token");
        assert_eq!(CheckTokenResponse::new(false).message, "Invalid token");
    }
}
