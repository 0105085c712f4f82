/*
 * Responsibility
 * - Types shared by the Credential Store, the token primitives and the request filter
 * - Role is a closed set; its canonical string form is what travels in the `role` claim
 */
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Client,
    Seller,
}

impl Role {
    /// Canonical form, as written into tokens and the `users.role` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "CLIENT",
            Role::Seller => "SELLER",
        }
    }

    /// Lenient parse used for registration input ("client", "Seller", ...).
    ///
    /// Token claims are never parsed through this: claim comparison is exact.
    pub fn from_name(name: &str) -> Option<Role> {
        match name.trim().to_ascii_lowercase().as_str() {
            "client" => Some(Role::Client),
            "seller" => Some(Role::Seller),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Principal as returned by the Credential Store.
///
/// `password_hash` belongs to the store; the core only hands it to the password verifier.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub id: String,
    pub identifier: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

impl fmt::Debug for AuthenticatedPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the password hash
        f.debug_struct("AuthenticatedPrincipal")
            .field("id", &self.id)
            .field("identifier", &self.identifier)
            .field("role", &self.role)
            .finish()
    }
}

/// A single granted authority. One per token (the role claim).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Authority(String);

impl Authority {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}
