//! # Error Hierarchy
//!
//! Structured error types shared across the VSCU bridge, built with
//! `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Remote and transport failures are NOT errors in this hierarchy — they are
//! classified call outcomes owned by the client layer. The types here cover
//! local validation and serialization only.

use thiserror::Error;

/// Domain primitive validation failures.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The tax identifier is not in the canonical PIN format
    /// (one letter, nine digits, one letter).
    #[error("invalid KRA PIN: {0:?}")]
    InvalidPin(String),

    /// The branch identifier is not a two-digit code.
    #[error("invalid branch id: {0:?} (expected two digits, e.g. \"00\")")]
    InvalidBranchId(String),

    /// A device timestamp string did not match the `YYYYMMDDhhmmss` wire
    /// format.
    #[error("invalid device timestamp: {0:?}")]
    InvalidDeviceTimestamp(String),
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
