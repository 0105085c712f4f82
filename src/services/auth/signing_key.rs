//! Signing key resolution for HMAC-signed access tokens.
//!
//! The key is resolved once per process and shared (read-only) by the issuer and the
//! validator. A configured secret shorter than [`MIN_SECRET_BYTES`] (or a missing/blank one)
//! falls back to a random key that only this process knows: tokens minted here will not
//! verify on another instance. That fallback never fails startup; it is logged instead.

use std::fmt;
use std::sync::{Arc, OnceLock};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

/// Minimum configured secret length (UTF-8 bytes) accepted as a signing key.
pub const MIN_SECRET_BYTES: usize = 32;

/// Size of the random fallback key (HS256).
const EPHEMERAL_KEY_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeakSecret {
    Missing,
    Blank,
    TooShort(usize),
}

impl fmt::Display for WeakSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeakSecret::Missing => write!(f, "secret not configured"),
            WeakSecret::Blank => write!(f, "secret is blank"),
            WeakSecret::TooShort(len) => write!(
                f,
                "secret is {} bytes (minimum {})",
                len, MIN_SECRET_BYTES
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Configured,
    Ephemeral(WeakSecret),
}

/// Symmetric key used to sign and verify tokens.
///
/// Key material is not printable via Debug.
#[derive(Clone)]
pub struct SigningKey {
    algorithm: Algorithm,
    source: KeySource,
    encoding: EncodingKey,
    decoding: DecodingKey,
    fingerprint: String,
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &self.algorithm)
            .field("source", &self.source)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

impl SigningKey {
    /// Derive the key from `secret`, or generate a random one when the secret is
    /// missing, blank or shorter than [`MIN_SECRET_BYTES`]. Never fails.
    pub fn resolve(secret: Option<&str>) -> Self {
        match check_secret(secret) {
            Ok(bytes) => Self::from_bytes(bytes, KeySource::Configured),
            Err(weak) => {
                let bytes = random_key_bytes();
                Self::from_bytes(&bytes, KeySource::Ephemeral(weak))
            }
        }
    }

    fn from_bytes(bytes: &[u8], source: KeySource) -> Self {
        Self {
            algorithm: algorithm_for_len(bytes.len()),
            source,
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            fingerprint: fingerprint(bytes),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn source(&self) -> KeySource {
        self.source
    }

    /// Short, non-reversible identifier of the key (for logs only).
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Process-wide holder of the resolved signing key.
///
/// `resolve` is safe under concurrent first use: exactly one key is ever created and every
/// caller gets the same `Arc`. There is no rotation or invalidation path.
#[derive(Debug, Default)]
pub struct KeyManager {
    key: OnceLock<Arc<SigningKey>>,
}

impl KeyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve (first call) or return the cached key. `secret` is ignored after the first call.
    pub fn resolve(&self, secret: Option<&str>) -> Arc<SigningKey> {
        self.key
            .get_or_init(|| {
                let key = SigningKey::resolve(secret);
                match key.source() {
                    KeySource::Configured => info!(
                        algorithm = ?key.algorithm(),
                        fingerprint = %key.fingerprint(),
                        "signing key derived from configured secret"
                    ),
                    KeySource::Ephemeral(reason) => warn!(
                        %reason,
                        algorithm = ?key.algorithm(),
                        fingerprint = %key.fingerprint(),
                        "ephemeral signing key; tokens are valid on this instance only"
                    ),
                }
                Arc::new(key)
            })
            .clone()
    }
}

fn check_secret(secret: Option<&str>) -> Result<&[u8], WeakSecret> {
    let secret = secret.ok_or(WeakSecret::Missing)?;
    if secret.trim().is_empty() {
        return Err(WeakSecret::Blank);
    }
    let bytes = secret.as_bytes();
    if bytes.len() < MIN_SECRET_BYTES {
        return Err(WeakSecret::TooShort(bytes.len()));
    }
    Ok(bytes)
}

// Strongest HMAC variant the key length supports.
fn algorithm_for_len(len: usize) -> Algorithm {
    if len >= 64 {
        Algorithm::HS512
    } else if len >= 48 {
        Algorithm::HS384
    } else {
        Algorithm::HS256
    }
}

fn random_key_bytes() -> [u8; EPHEMERAL_KEY_BYTES] {
    let mut bytes = [0u8; EPHEMERAL_KEY_BYTES];
    getrandom::fill(&mut bytes).expect("getrandom failed");
    bytes
}

fn fingerprint(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = URL_SAFE_NO_PAD.encode(digest);
    out.truncate(10);
    out
}
