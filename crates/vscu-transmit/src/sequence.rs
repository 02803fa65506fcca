//! # Document Sequence Counters
//!
//! The device requires a monotonically increasing document number per
//! document type. Counters are in-process and thread-safe; callers that
//! need durability across restarts seed them from their own storage via
//! [`SequenceCounters::starting_at`].

use std::sync::atomic::{AtomicU64, Ordering};

use crate::document::DocumentKind;

/// Per-document-type monotonic counters, first value 1.
#[derive(Debug, Default)]
pub struct SequenceCounters {
    sales: AtomicU64,
    credit: AtomicU64,
    purchase: AtomicU64,
}

impl SequenceCounters {
    /// Counters starting at 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters resuming after previously issued numbers.
    pub fn starting_at(sales: u64, credit: u64, purchase: u64) -> Self {
        Self {
            sales: AtomicU64::new(sales),
            credit: AtomicU64::new(credit),
            purchase: AtomicU64::new(purchase),
        }
    }

    /// Draw the next number for a document type. Never repeats, never
    /// decreases.
    pub fn next(&self, kind: DocumentKind) -> u64 {
        let counter = match kind {
            DocumentKind::SalesInvoice => &self.sales,
            DocumentKind::CreditNote => &self.credit,
            DocumentKind::Purchase => &self.purchase,
        };
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}
