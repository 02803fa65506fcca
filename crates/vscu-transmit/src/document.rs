//! # Fiscal Document Model
//!
//! Plain data-transfer objects the calling application hands to the
//! orchestrator. No ORM coupling: the caller maps its own business records
//! into [`FiscalDocument`] and persists whatever comes back.
//!
//! State and transmission record are private: the only path to
//! [`DocumentState::Confirmed`] is [`FiscalDocument::confirm`], which writes
//! the [`TransmissionRecord`] and the state transition together — a receipt
//! can never be recorded against a document left unconfirmed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vscu_client::Operation;
use vscu_core::{DeviceTimestamp, DocumentId, KraPin};

/// Category of a fiscal document, determining the submission operation and
/// receipt type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Customer-facing sales invoice.
    SalesInvoice,
    /// Reversal of a previously confirmed sales invoice.
    CreditNote,
    /// Confirmation of a purchase document received from a supplier.
    Purchase,
}

impl DocumentKind {
    /// The device operation this document kind travels through. Credit
    /// notes ride the sales endpoint with a refund receipt-type code.
    pub fn operation(&self) -> Operation {
        match self {
            Self::SalesInvoice | Self::CreditNote => Operation::SubmitSale,
            Self::Purchase => Operation::ConfirmPurchase,
        }
    }

    /// Receipt type code in the device vocabulary.
    pub fn receipt_type_code(&self) -> &'static str {
        match self {
            Self::SalesInvoice => "S",
            Self::CreditNote => "R",
            Self::Purchase => "P",
        }
    }

    /// Stable snake_case name for log output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SalesInvoice => "sales_invoice",
            Self::CreditNote => "credit_note",
            Self::Purchase => "purchase",
        }
    }
}

/// Classification codes the device requires per catalog entry. Values are
/// opaque enumerated codes supplied by the caller's catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemClassification {
    /// Commodity classification code (UNSPSC-style).
    pub commodity_code: Option<String>,
    /// Packaging unit code.
    pub packaging_unit: Option<String>,
    /// Quantity unit code.
    pub quantity_unit: Option<String>,
}

/// One document line, resolved against the caller's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLine {
    /// Caller-side item code.
    pub item_code: String,
    /// Item description as printed on the document.
    pub description: String,
    /// Quantity sold or purchased.
    pub quantity: f64,
    /// Unit price.
    pub unit_price: f64,
    /// Opaque tax type code.
    pub tax_code: String,
    /// Tax rate applied, as a percentage.
    pub tax_rate: f64,
    /// Tax amount for the line.
    pub tax_amount: f64,
    /// Line total including tax.
    pub line_total: f64,
    /// Classification codes from the catalog.
    pub classification: ItemClassification,
}

/// Fields a credit note must carry in addition to the sale fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditNoteDetails {
    /// Receipt number of the original invoice being reversed.
    pub original_receipt_number: Option<u64>,
    /// Opaque refund reason code.
    pub reason_code: Option<String>,
}

/// Lifecycle state of a document with respect to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentState {
    /// Not yet confirmed by the device.
    Pending,
    /// Confirmed; the transmission record is populated and immutable.
    Confirmed,
    /// Abandoned by the caller after a terminal remote rejection.
    Rejected,
}

/// The authoritative receipt metadata the device returns on confirmation.
///
/// Once attached to a document with a non-empty signature, the record is
/// immutable — the document can never be resubmitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransmissionRecord {
    /// Device-assigned receipt number.
    pub receipt_number: u64,
    /// Cryptographic receipt signature confirming acceptance.
    pub receipt_signature: String,
    /// Device-reported confirmation timestamp.
    pub confirmed_at: DeviceTimestamp,
    /// Raw internal data blob echoed by the device.
    pub internal_data: String,
}

/// Attempted state transitions that violate the confirmation invariant.
#[derive(Debug, Error)]
pub enum TransitionError {
    /// The document already carries a confirmed receipt signature.
    #[error("document {0} already carries a confirmed receipt signature")]
    AlreadyConfirmed(DocumentId),
}

/// A fiscal document as handed over by the calling application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiscalDocument {
    /// Caller-side document identity.
    pub id: DocumentId,
    /// Document category.
    pub kind: DocumentKind,
    /// Customer tax identifier, when known.
    pub customer_pin: Option<KraPin>,
    /// Customer display name.
    pub customer_name: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Document lines.
    pub lines: Vec<DocumentLine>,
    /// Document total including tax.
    pub total_amount: f64,
    /// Total tax across all lines.
    pub total_tax: f64,
    /// Issue timestamp.
    pub issued_at: DeviceTimestamp,
    /// Present iff `kind` is [`DocumentKind::CreditNote`].
    pub credit_note: Option<CreditNoteDetails>,
    state: DocumentState,
    transmission: Option<TransmissionRecord>,
}

impl FiscalDocument {
    /// Create an empty pending document of the given kind. The caller fills
    /// in the public fields before submission.
    pub fn new(id: DocumentId, kind: DocumentKind) -> Self {
        Self {
            id,
            kind,
            customer_pin: None,
            customer_name: String::new(),
            currency: "KES".to_string(),
            lines: Vec::new(),
            total_amount: 0.0,
            total_tax: 0.0,
            issued_at: DeviceTimestamp::now(),
            credit_note: None,
            state: DocumentState::Pending,
            transmission: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DocumentState {
        self.state
    }

    /// The transmission record, populated once confirmed.
    pub fn transmission(&self) -> Option<&TransmissionRecord> {
        self.transmission.as_ref()
    }

    /// True when the document carries a confirmed receipt signature — the
    /// idempotence boundary: such a document must never be resubmitted.
    pub fn has_confirmed_receipt(&self) -> bool {
        self.transmission
            .as_ref()
            .is_some_and(|record| !record.receipt_signature.is_empty())
    }

    /// Attach the device receipt and transition to
    /// [`DocumentState::Confirmed`] in one step.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::AlreadyConfirmed`] if a confirmed receipt
    /// is already attached; the existing record is left untouched.
    pub fn confirm(&mut self, record: TransmissionRecord) -> Result<(), TransitionError> {
        if self.has_confirmed_receipt() {
            return Err(TransitionError::AlreadyConfirmed(self.id));
        }
        self.transmission = Some(record);
        self.state = DocumentState::Confirmed;
        Ok(())
    }

    /// Mark the document abandoned after a terminal remote rejection.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::AlreadyConfirmed`] for a confirmed
    /// document — a confirmed receipt cannot be walked back locally.
    pub fn reject(&mut self) -> Result<(), TransitionError> {
        if self.has_confirmed_receipt() {
            return Err(TransitionError::AlreadyConfirmed(self.id));
        }
        self.state = DocumentState::Rejected;
        Ok(())
    }
}
