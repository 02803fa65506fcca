//! # HMAC-SHA256 Request Signing
//!
//! `sign` produces a base64-encoded MAC over canonical payload bytes;
//! `verify` recomputes and compares in constant time. Verification returns
//! `false` — never panics, never errors — on malformed signature encoding,
//! so a hostile or corrupted signature string cannot distinguish itself
//! from a merely wrong one.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use vscu_core::CanonicalBytes;

type HmacSha256 = Hmac<Sha256>;

/// Errors constructing a signing key.
#[derive(Error, Debug)]
pub enum KeyError {
    /// The shared CMC key must not be empty.
    #[error("signing key must not be empty")]
    Empty,
}

/// The shared secret (CMC key) issued for a device credential set.
///
/// Custom `Debug` implementation redacts the key material to prevent
/// credential leakage in log output.
#[derive(Clone)]
pub struct SigningKey(String);

impl SigningKey {
    /// Create a signing key, rejecting empty key material.
    pub fn new(value: impl Into<String>) -> Result<Self, KeyError> {
        let s = value.into();
        if s.is_empty() {
            return Err(KeyError::Empty);
        }
        Ok(Self(s))
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SigningKey").field(&"[REDACTED]").finish()
    }
}

/// A base64-encoded HMAC-SHA256 request signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSignature(String);

impl RequestSignature {
    /// Access the base64 signature string for header transmission.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sign canonical payload bytes with the shared key.
///
/// Deterministic: the same `(payload, key)` pair always yields the same
/// signature. Never fails — HMAC accepts keys of any non-zero length and
/// the key is non-empty by construction.
pub fn sign(payload: &CanonicalBytes, key: &SigningKey) -> RequestSignature {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .expect("HMAC-SHA256 accepts any key length");
    mac.update(payload.as_bytes());
    RequestSignature(BASE64.encode(mac.finalize().into_bytes()))
}

/// Verify a base64 signature against canonical payload bytes.
///
/// Recomputes the MAC and compares in constant time. Returns `false` on
/// any failure, including signature strings that are not valid base64 or
/// decode to the wrong length.
pub fn verify(payload: &CanonicalBytes, signature: &str, key: &SigningKey) -> bool {
    let Ok(presented) = BASE64.decode(signature) else {
        return false;
    };

    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .expect("HMAC-SHA256 accepts any key length");
    mac.update(payload.as_bytes());
    let expected = mac.finalize().into_bytes();

    if presented.len() != expected.len() {
        return false;
    }
    expected.ct_eq(presented.as_slice()).into()
}
