//! # Call Outcome Classification
//!
//! Every device call resolves to exactly one [`CallOutcome`] variant. The
//! client never raises for expected failure paths — remote rejections and
//! transport faults are data the orchestration layer must handle
//! exhaustively. Retry policy belongs to the caller; [`CallOutcome::is_retryable`]
//! tells it which outcomes are safe to retry.

use serde_json::{Map, Value};

/// How a transport-level failure manifested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The configured deadline elapsed before the round trip completed.
    Timeout,
    /// No usable response: connection refused, DNS failure, TLS failure,
    /// or the stream died mid-response.
    Connection,
    /// A 2xx response whose body is not parseable structured data.
    MalformedResponse,
    /// A non-2xx HTTP status.
    HttpStatus {
        /// The status code the device host returned.
        status: u16,
    },
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Connection => write!(f, "connection"),
            Self::MalformedResponse => write!(f, "malformed-response"),
            Self::HttpStatus { status } => write!(f, "http-status {status}"),
        }
    }
}

/// The uniform result of one device call. Never partially filled.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// The device accepted the request; `data` is the nested response
    /// payload.
    Success {
        /// Contents of the envelope's `data` field.
        data: Map<String, Value>,
    },
    /// The device processed the request and rejected it. Terminal for this
    /// attempt; requires human correction, not a retry.
    ApplicationError {
        /// Remote result code (anything other than the all-clear `"000"`).
        code: String,
        /// Remote-supplied message.
        message: String,
        /// Remote-supplied timestamp, when present.
        timestamp: Option<String>,
    },
    /// The request never produced a usable device verdict. Transient; safe
    /// to retry.
    TransportError {
        /// Failure classification.
        kind: TransportErrorKind,
        /// Human-readable detail.
        message: String,
    },
}

impl CallOutcome {
    /// True for [`CallOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// True only for transport errors — the device never saw or never
    /// answered the request, so resubmission cannot double-apply it.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportError { .. })
    }
}
