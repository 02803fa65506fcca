//! # Identity Newtypes
//!
//! Domain-primitive newtypes for the identifiers the device protocol cares
//! about. Each identifier is a distinct type — you cannot pass a [`BranchId`]
//! where a [`KraPin`] is expected.
//!
//! String-based identifiers validate format at construction time. The
//! UUID-based [`DocumentId`] is always valid by construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// A KRA taxpayer PIN.
///
/// Canonical form: eleven characters — one ASCII uppercase letter, nine
/// ASCII digits, one ASCII uppercase letter (e.g. `P052386110T`).
/// Lowercase input is upcased during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KraPin(String);

impl KraPin {
    /// Create a PIN from a string value, validating the letter-digits-letter
    /// format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPin`] if the value is not eleven
    /// characters of the shape `A#########Z`.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s: String = value.into().to_ascii_uppercase();
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 11
            && bytes[0].is_ascii_uppercase()
            && bytes[1..10].iter().all(u8::is_ascii_digit)
            && bytes[10].is_ascii_uppercase();
        if !well_formed {
            return Err(ValidationError::InvalidPin(s));
        }
        Ok(Self(s))
    }

    /// Access the PIN string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for KraPin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A branch (business location) code as registered with the device.
///
/// Exactly two ASCII digits. `"00"` is the headquarters branch and the
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchId(String);

impl BranchId {
    /// Create a branch id from a string value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidBranchId`] unless the value is
    /// exactly two ASCII digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.len() != 2 || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidBranchId(s));
        }
        Ok(Self(s))
    }

    /// Access the branch code string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BranchId {
    fn default() -> Self {
        Self("00".to_string())
    }
}

impl std::fmt::Display for BranchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a fiscal document inside the calling application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Create a new random document identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a document identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
