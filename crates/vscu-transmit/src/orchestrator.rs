//! # Transmission Orchestrator
//!
//! [`Transmitter`] drives the full submission sequence: idempotence guard,
//! pre-flight validation, payload construction, dispatch, and receipt
//! reconciliation. Every path out of [`Transmitter::submit`] is a
//! [`SubmissionOutcome`] the caller persists and acts on; nothing is thrown.
//!
//! Exclusive access per document comes from `&mut FiscalDocument` — two
//! submissions for one document cannot execute concurrently, which is what
//! makes the confirmed-receipt guard sound.

use serde_json::{Map, Value};

use vscu_client::{CallOutcome, DeviceClient, Operation, TransportErrorKind};
use vscu_core::DeviceTimestamp;

use crate::document::{FiscalDocument, TransmissionRecord};
use crate::master::{
    parse_code_list, CustomerRegistration, DeviceCode, ItemRegistration,
};
use crate::payload::build_submission_payload;
use crate::sequence::SequenceCounters;
use crate::validation::{validate, ValidationMessage};

/// Severity flag for the operator-facing notification collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    /// The operation succeeded.
    Info,
    /// The operation did not complete; the message says whether a retry
    /// can help.
    Warning,
}

/// Result of one submission attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// The device confirmed the document; the transmission record has been
    /// written onto it.
    Confirmed {
        /// Device-assigned receipt number.
        receipt_number: u64,
    },
    /// The document already carries a confirmed receipt signature; nothing
    /// was sent.
    AlreadyTransmitted,
    /// Pre-flight validation blocked the submission; nothing was sent.
    /// Every violated rule is listed.
    Invalid(Vec<ValidationMessage>),
    /// The device processed and rejected the document. Terminal for this
    /// attempt; requires human correction.
    RemoteRejected {
        /// Remote result code.
        code: String,
        /// Remote-supplied message.
        message: String,
    },
    /// The device never produced a usable verdict. The document is
    /// unchanged and a later retry is safe.
    TransportFailed {
        /// Transport failure classification.
        kind: TransportErrorKind,
        /// Human-readable detail.
        message: String,
    },
}

impl SubmissionOutcome {
    /// Human-readable summary plus severity for the operator notification.
    /// Remote rejections and transport failures read differently: only the
    /// latter invite a retry.
    pub fn report(&self) -> (String, NoticeSeverity) {
        match self {
            Self::Confirmed { receipt_number } => (
                format!("document confirmed by the device, receipt {receipt_number}"),
                NoticeSeverity::Info,
            ),
            Self::AlreadyTransmitted => (
                "document already carries a confirmed receipt and was not resent".to_string(),
                NoticeSeverity::Warning,
            ),
            Self::Invalid(messages) => {
                let rules: Vec<&str> = messages.iter().map(|m| m.message.as_str()).collect();
                (
                    format!("submission blocked by validation: {}", rules.join("; ")),
                    NoticeSeverity::Warning,
                )
            }
            Self::RemoteRejected { code, message } => (
                format!(
                    "the device rejected the document ({code}): {message} — correct the \
                     document before submitting again"
                ),
                NoticeSeverity::Warning,
            ),
            Self::TransportFailed { kind, message } => (
                format!("could not reach the device ({kind}): {message} — safe to retry later"),
                NoticeSeverity::Warning,
            ),
        }
    }
}

/// Result of a master-data registration call.
#[derive(Debug, Clone, PartialEq)]
pub enum MasterDataOutcome {
    /// The device accepted the record.
    Accepted {
        /// Nested response payload.
        data: Map<String, Value>,
    },
    /// The device rejected the record.
    Rejected {
        /// Remote result code.
        code: String,
        /// Remote-supplied message.
        message: String,
    },
    /// Transport-level failure; safe to retry.
    TransportFailed {
        /// Transport failure classification.
        kind: TransportErrorKind,
        /// Human-readable detail.
        message: String,
    },
}

impl From<CallOutcome> for MasterDataOutcome {
    fn from(outcome: CallOutcome) -> Self {
        match outcome {
            CallOutcome::Success { data } => Self::Accepted { data },
            CallOutcome::ApplicationError { code, message, .. } => {
                Self::Rejected { code, message }
            }
            CallOutcome::TransportError { kind, message } => {
                Self::TransportFailed { kind, message }
            }
        }
    }
}

/// Result of a code-table fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum CodeFetchOutcome {
    /// The device returned its code tables.
    Fetched(Vec<DeviceCode>),
    /// The device rejected the request.
    Rejected {
        /// Remote result code.
        code: String,
        /// Remote-supplied message.
        message: String,
    },
    /// Transport-level failure; safe to retry.
    TransportFailed {
        /// Transport failure classification.
        kind: TransportErrorKind,
        /// Human-readable detail.
        message: String,
    },
}

/// Orchestrates document transmission for one counterparty.
#[derive(Debug)]
pub struct Transmitter {
    client: DeviceClient,
    sequences: SequenceCounters,
}

impl Transmitter {
    /// Create a transmitter with fresh sequence counters.
    pub fn new(client: DeviceClient) -> Self {
        Self::with_sequences(client, SequenceCounters::new())
    }

    /// Create a transmitter resuming previously issued sequence numbers.
    pub fn with_sequences(client: DeviceClient, sequences: SequenceCounters) -> Self {
        Self { client, sequences }
    }

    /// Access the underlying device client.
    pub fn client(&self) -> &DeviceClient {
        &self.client
    }

    /// Submit a document to the device.
    ///
    /// Fail-fast paths (already confirmed, blocking validation) return
    /// without any network call. On device confirmation the transmission
    /// record and the `Confirmed` state are written onto the document
    /// together; on every other outcome the document is left untouched.
    pub async fn submit(&self, document: &mut FiscalDocument) -> SubmissionOutcome {
        if document.has_confirmed_receipt() {
            tracing::info!(
                document = %document.id,
                "refusing to resubmit a confirmed document"
            );
            return SubmissionOutcome::AlreadyTransmitted;
        }

        let messages = validate(document, true);
        if messages.iter().any(ValidationMessage::is_blocking) {
            tracing::warn!(
                document = %document.id,
                rules = messages.len(),
                "submission blocked by pre-flight validation"
            );
            return SubmissionOutcome::Invalid(messages);
        }

        let sequence_no = self.sequences.next(document.kind);
        let config = self.client.config();
        let payload =
            build_submission_payload(document, sequence_no, &config.pin, &config.branch_id);

        let outcome = self.client.call(document.kind.operation(), &payload).await;
        match outcome {
            CallOutcome::Success { data } => match parse_receipt(&data) {
                Ok(record) => {
                    let receipt_number = record.receipt_number;
                    if document.confirm(record).is_err() {
                        // Unreachable behind &mut and the guard above.
                        return SubmissionOutcome::AlreadyTransmitted;
                    }
                    tracing::info!(
                        document = %document.id,
                        receipt = receipt_number,
                        "document confirmed"
                    );
                    SubmissionOutcome::Confirmed { receipt_number }
                }
                Err(detail) => {
                    tracing::warn!(
                        document = %document.id,
                        detail = %detail,
                        "success envelope missing receipt fields"
                    );
                    SubmissionOutcome::TransportFailed {
                        kind: TransportErrorKind::MalformedResponse,
                        message: format!("device confirmation was unusable: {detail}"),
                    }
                }
            },
            CallOutcome::ApplicationError { code, message, .. } => {
                SubmissionOutcome::RemoteRejected { code, message }
            }
            CallOutcome::TransportError { kind, message } => {
                SubmissionOutcome::TransportFailed { kind, message }
            }
        }
    }

    /// Register an item master record.
    pub async fn register_item(&self, item: &ItemRegistration) -> MasterDataOutcome {
        let config = self.client.config();
        let payload = item.to_payload(&config.pin, &config.branch_id);
        self.client
            .call(Operation::RegisterItem, &payload)
            .await
            .into()
    }

    /// Register a customer master record.
    pub async fn register_customer(
        &self,
        customer: &CustomerRegistration,
    ) -> MasterDataOutcome {
        let config = self.client.config();
        let payload = customer.to_payload(&config.pin, &config.branch_id);
        self.client
            .call(Operation::RegisterCustomer, &payload)
            .await
            .into()
    }

    /// Fetch the device code tables.
    pub async fn fetch_codes(&self) -> CodeFetchOutcome {
        let config = self.client.config();
        let mut payload = Map::new();
        payload.insert("tin".into(), Value::String(config.pin.as_str().to_string()));
        payload.insert(
            "bhfId".into(),
            Value::String(config.branch_id.as_str().to_string()),
        );

        match self.client.call(Operation::FetchCodes, &payload).await {
            CallOutcome::Success { data } => CodeFetchOutcome::Fetched(parse_code_list(&data)),
            CallOutcome::ApplicationError { code, message, .. } => {
                CodeFetchOutcome::Rejected { code, message }
            }
            CallOutcome::TransportError { kind, message } => {
                CodeFetchOutcome::TransportFailed { kind, message }
            }
        }
    }
}

/// Extract the transmission record from a confirmation payload.
fn parse_receipt(data: &Map<String, Value>) -> Result<TransmissionRecord, String> {
    let receipt_number = match data.get("curRcptNo") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
    .ok_or("missing or non-numeric curRcptNo")?;

    let receipt_signature = data
        .get("rcptSign")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or("missing or empty rcptSign")?
        .to_string();

    let timestamp = data
        .get("sdcDateTime")
        .or_else(|| data.get("vsdcRcptPbctDate"))
        .and_then(Value::as_str)
        .ok_or("missing confirmation timestamp")?;
    let confirmed_at = DeviceTimestamp::parse_wire(timestamp)
        .map_err(|_| format!("unparseable confirmation timestamp {timestamp:?}"))?;

    let internal_data = data
        .get("intrlData")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(TransmissionRecord {
        receipt_number,
        receipt_signature,
        confirmed_at,
        internal_data,
    })
}
