//! # Pre-flight Validation
//!
//! Local checks that run before any network call. Each violated rule yields
//! one named message covering every offending line, so a blocking failure
//! lists everything the operator has to fix — no short-circuiting.
//!
//! Severity escalates with context: while a document is being drafted the
//! catalog gaps are advisories; at finalization they block submission.

use serde::{Deserialize, Serialize};

use crate::document::{DocumentKind, FiscalDocument};

/// Whether a validation message prevents submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Worth surfacing, does not prevent submission.
    Advisory,
    /// Submission is refused while this rule is violated.
    Blocking,
}

/// One violated rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMessage {
    /// Stable rule identifier.
    pub rule: &'static str,
    /// Human-readable description naming the offending lines.
    pub message: String,
    /// Whether the rule blocks submission in the current context.
    pub severity: Severity,
}

impl ValidationMessage {
    /// True when this message prevents submission.
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Blocking
    }
}

/// Validate a document for transmission.
///
/// `finalizing` escalates catalog and credit-note rules from advisory to
/// blocking. The already-transmitted guard is blocking in every context.
pub fn validate(document: &FiscalDocument, finalizing: bool) -> Vec<ValidationMessage> {
    let escalated = if finalizing {
        Severity::Blocking
    } else {
        Severity::Advisory
    };
    let mut messages = Vec::new();

    if document.has_confirmed_receipt() {
        messages.push(ValidationMessage {
            rule: "already-transmitted",
            message: format!(
                "document {} already carries receipt signature {}; it must not be sent again",
                document.id,
                document
                    .transmission()
                    .map(|r| r.receipt_signature.as_str())
                    .unwrap_or_default(),
            ),
            severity: Severity::Blocking,
        });
    }

    push_catalog_rule(
        &mut messages,
        document,
        "commodity-code-missing",
        "missing a commodity classification code",
        escalated,
        |line| line.classification.commodity_code.is_none(),
    );
    push_catalog_rule(
        &mut messages,
        document,
        "packaging-unit-missing",
        "missing a packaging unit code",
        escalated,
        |line| line.classification.packaging_unit.is_none(),
    );
    push_catalog_rule(
        &mut messages,
        document,
        "quantity-unit-missing",
        "missing a quantity unit code",
        escalated,
        |line| line.classification.quantity_unit.is_none(),
    );

    if document.kind == DocumentKind::CreditNote {
        let details = document.credit_note.clone().unwrap_or_default();
        if details.reason_code.is_none() {
            messages.push(ValidationMessage {
                rule: "credit-note-reason-missing",
                message: "credit note has no refund reason code".to_string(),
                severity: escalated,
            });
        }
        if details.original_receipt_number.is_none() {
            messages.push(ValidationMessage {
                rule: "credit-note-reference-missing",
                message: "credit note does not reference the original invoice receipt"
                    .to_string(),
                severity: escalated,
            });
        }
    }

    messages
}

fn push_catalog_rule(
    messages: &mut Vec<ValidationMessage>,
    document: &FiscalDocument,
    rule: &'static str,
    what: &str,
    severity: Severity,
    violated: impl Fn(&crate::document::DocumentLine) -> bool,
) {
    let offending: Vec<&str> = document
        .lines
        .iter()
        .filter(|line| violated(line))
        .map(|line| line.item_code.as_str())
        .collect();
    if !offending.is_empty() {
        messages.push(ValidationMessage {
            rule,
            message: format!("item(s) {} {what}", offending.join(", ")),
            severity,
        });
    }
}
