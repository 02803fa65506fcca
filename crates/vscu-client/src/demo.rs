//! # Simulation Responder
//!
//! Deterministic stand-in for the remote device, selected purely by
//! [`DeviceMode::Simulation`](crate::config::DeviceMode::Simulation). It
//! never performs network I/O, which makes fully offline integration
//! testing possible.
//!
//! Synthetic receipt signatures are derived from a SHA-256 fingerprint of
//! the request payload, so repeated identical test runs reproduce the same
//! signatures. This fingerprint is a simulation convenience only — the real
//! signing path lives in `vscu-crypto`, takes key material, and shares no
//! code with this module.

use std::sync::atomic::{AtomicU64, Ordering};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use vscu_core::DeviceTimestamp;

use crate::endpoint::Operation;
use crate::outcome::CallOutcome;

/// Offline responder with in-process receipt counters.
#[derive(Debug, Default)]
pub struct DemoResponder {
    invoice_no: AtomicU64,
    receipt_no: AtomicU64,
}

impl DemoResponder {
    /// Create a responder with counters starting at 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer an operation with a structurally valid success payload.
    ///
    /// Always returns [`CallOutcome::Success`]; the simulation has no
    /// failure modes.
    pub fn simulate(&self, operation: Operation, payload: &Map<String, Value>) -> CallOutcome {
        let data = match operation {
            Operation::SubmitSale => {
                let invoice_no = self.invoice_no.fetch_add(1, Ordering::SeqCst) + 1;
                let receipt_no = self.receipt_no.fetch_add(1, Ordering::SeqCst) + 1;
                let now = DeviceTimestamp::now().to_wire();
                let rendered = render(payload);
                json!({
                    "invcNo": invoice_no,
                    "curRcptNo": receipt_no,
                    "rcptSign": fingerprint(&rendered),
                    "sdcDateTime": now,
                    "intrlData": BASE64.encode(&rendered),
                })
            }
            Operation::ConfirmPurchase => json!({ "status": "approved" }),
            Operation::RegisterItem => json!({
                "itemCd": payload
                    .get("itemCd")
                    .cloned()
                    .unwrap_or_else(|| Value::String("DEMO-ITEM".to_string())),
            }),
            Operation::RegisterCustomer => json!({ "status": "saved" }),
            Operation::FetchCodes => json!({ "codeList": [] }),
            _ => json!({}),
        };

        let Value::Object(data) = data else {
            unreachable!("simulation payloads are JSON objects");
        };
        CallOutcome::Success { data }
    }
}

fn render(payload: &Map<String, Value>) -> Vec<u8> {
    serde_json::to_vec(payload).expect("JSON maps always serialize")
}

/// Synthetic receipt signature: `DEMO` plus a truncated hex SHA-256 of the
/// payload rendering.
fn fingerprint(rendered: &[u8]) -> String {
    let digest = Sha256::digest(rendered);
    format!("DEMO{}", &hex::encode(digest)[..32])
}
