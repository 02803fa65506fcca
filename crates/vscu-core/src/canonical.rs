//! # Canonical Serialization
//!
//! Defines [`CanonicalBytes`], the sole construction path for bytes used in
//! signature computation across the bridge.
//!
//! ## Security Invariant
//!
//! The inner `Vec<u8>` is private. The only way to construct
//! `CanonicalBytes` is through [`CanonicalBytes::new()`], so every signature
//! in the workspace is computed over the same byte-for-byte rendering that
//! the remote party recomputes: object keys sorted lexicographically,
//! compact separators, no insignificant whitespace.

use serde::Serialize;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by canonical JSON serialization.
///
/// The inner `Vec<u8>` is private — downstream code cannot construct
/// `CanonicalBytes` except through [`CanonicalBytes::new()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// The value is first lifted to a `serde_json::Value`; serde_json's
    /// default map representation orders keys lexicographically, and
    /// `to_vec` emits compact separators, so two logically equal payloads
    /// with different key insertion orders produce identical bytes.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Ok(Self(serde_json::to_vec(&value)?))
    }

    /// Access the canonical bytes for signature computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the inner byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
