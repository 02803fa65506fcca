//! # vscu-client — Device Client for the VSCU Bridge
//!
//! Typed access to the tax-device API. One [`DeviceClient`] per counterparty
//! credential set; each call is signed, dispatched, and classified into a
//! [`CallOutcome`] that the orchestration layer handles exhaustively.
//!
//! ## Architecture
//!
//! - [`config`] — per-counterparty credentials, operating mode, timeouts.
//! - [`endpoint`] — the closed set of device operations and the per-mode
//!   base-URL registry.
//! - [`outcome`] — the uniform result shape. Expected remote and transport
//!   failures are values, never `Err`.
//! - [`client`] — the signed HTTP transport over a pooled `reqwest::Client`.
//! - [`demo`] — the offline simulation responder, selected purely by
//!   [`DeviceMode::Simulation`](config::DeviceMode::Simulation); it never
//!   performs network I/O.

pub mod client;
pub mod config;
pub mod demo;
pub mod endpoint;
pub mod outcome;

pub use client::DeviceClient;
pub use config::{ConfigError, DeviceConfig, DeviceMode};
pub use demo::DemoResponder;
pub use endpoint::{EndpointRegistry, Operation};
pub use outcome::{CallOutcome, TransportErrorKind};
