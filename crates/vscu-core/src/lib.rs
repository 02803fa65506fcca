//! # vscu-core — Foundational Types for the VSCU Bridge
//!
//! This crate provides the building blocks shared by every layer of the
//! fiscal-device integration:
//!
//! - **Identifier newtypes** ([`KraPin`], [`BranchId`], [`DocumentId`]) that
//!   validate format at construction time.
//! - **Canonical serialization** ([`CanonicalBytes`]) — the sole construction
//!   path for bytes that get signed.
//! - **Device timestamps** ([`DeviceTimestamp`]) in the `YYYYMMDDhhmmss`
//!   wire format the tax device expects, pinned to the device's local zone.
//! - **Structured errors** built with `thiserror`.

pub mod canonical;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{BranchId, DocumentId, KraPin};
pub use temporal::DeviceTimestamp;
