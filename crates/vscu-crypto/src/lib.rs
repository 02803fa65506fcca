//! # vscu-crypto — Request Signing for the VSCU Bridge
//!
//! The device API authenticates each request with an HMAC-SHA256 message
//! authentication code computed over the canonical JSON rendering of the
//! payload, keyed by the counterparty's shared CMC key.
//!
//! ## Security Invariant
//!
//! Signing takes [`CanonicalBytes`](vscu_core::CanonicalBytes) — not raw
//! `&[u8]` and not a `Serialize` value. The canonicalization step cannot be
//! skipped or reimplemented ad hoc, so the bytes this crate signs are always
//! the bytes the remote party independently recomputes.
//!
//! The offline simulation responder produces look-alike synthetic
//! signatures via a plain payload fingerprint; that path lives in
//! `vscu-client` and never touches this crate or any key material.

pub mod signing;

pub use signing::{sign, verify, KeyError, RequestSignature, SigningKey};
