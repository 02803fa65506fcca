//! # vscu-transmit — Document Transmission Orchestration
//!
//! Takes a business document, checks that it can legally travel, builds the
//! device wire payload, dispatches it through `vscu-client`, and reconciles
//! the authoritative response (receipt signature, sequence numbers,
//! timestamps) back onto the document.
//!
//! ## Contract with the calling application
//!
//! The caller supplies a [`FiscalDocument`] — a plain data-transfer object
//! decoupled from any persistence framework — and gets back a
//! [`SubmissionOutcome`] it must persist and act on. A document that already
//! carries a confirmed receipt signature is never resubmitted; the guard is
//! checked locally before any network call.

pub mod document;
pub mod master;
pub mod orchestrator;
pub mod payload;
pub mod sequence;
pub mod validation;

pub use document::{
    CreditNoteDetails, DocumentKind, DocumentLine, DocumentState, FiscalDocument,
    ItemClassification, TransmissionRecord,
};
pub use master::{CustomerRegistration, DeviceCode, ItemRegistration};
pub use orchestrator::{
    CodeFetchOutcome, MasterDataOutcome, NoticeSeverity, SubmissionOutcome, Transmitter,
};
pub use sequence::SequenceCounters;
pub use validation::{validate, Severity, ValidationMessage};
