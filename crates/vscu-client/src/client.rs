//! # Signed HTTP Transport
//!
//! [`DeviceClient`] owns one pooled `reqwest::Client` per counterparty
//! credential set and turns every call into a classified [`CallOutcome`].
//!
//! Identity headers are attached fresh on each request — never as session
//! defaults — so a client instance reused across counterparties cannot leak
//! a stale credential set from an earlier call.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};

use vscu_core::CanonicalBytes;
use vscu_crypto::sign;

use crate::config::{ConfigError, DeviceConfig, DeviceMode};
use crate::demo::DemoResponder;
use crate::endpoint::Operation;
use crate::outcome::{CallOutcome, TransportErrorKind};

/// The device's all-clear result code.
const RESULT_OK: &str = "000";

/// Maximum number of body characters carried into an error message.
const BODY_EXCERPT_CHARS: usize = 200;

/// Response envelope every device endpoint answers with.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseEnvelope {
    result_cd: String,
    #[serde(default)]
    result_msg: String,
    #[serde(default)]
    result_dt: Option<String>,
    #[serde(default)]
    data: Option<Map<String, Value>>,
}

/// Client for one counterparty credential set.
///
/// Stateless across calls apart from the pooled HTTP session; safe to share
/// behind an `Arc` across async tasks.
#[derive(Debug)]
pub struct DeviceClient {
    http: reqwest::Client,
    config: DeviceConfig,
    demo: DemoResponder,
}

impl DeviceClient {
    /// Build a client from configuration.
    pub fn new(config: DeviceConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()?;
        Ok(Self {
            http,
            config,
            demo: DemoResponder::new(),
        })
    }

    /// Access the configuration this client was built from.
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Execute an operation. The config's timeout override applies when
    /// set; otherwise the operation's default governs.
    pub async fn call(&self, operation: Operation, payload: &Map<String, Value>) -> CallOutcome {
        let timeout = self
            .config
            .timeout
            .unwrap_or_else(|| operation.default_timeout());
        self.call_with_timeout(operation, payload, timeout).await
    }

    /// Execute an operation with an explicit timeout bounding the full
    /// round trip.
    ///
    /// Expected failures (timeout, connection loss, malformed body,
    /// non-success result code) are returned as outcomes, never raised.
    pub async fn call_with_timeout(
        &self,
        operation: Operation,
        payload: &Map<String, Value>,
        timeout: Duration,
    ) -> CallOutcome {
        if self.config.mode == DeviceMode::Simulation {
            tracing::debug!(operation = operation.name(), "answering from simulation responder");
            return self.demo.simulate(operation, payload);
        }

        let canonical =
            CanonicalBytes::new(payload).expect("JSON maps always canonicalize");
        let key = self
            .config
            .signing_key()
            .expect("validated at construction: live modes carry a key");
        let signature = sign(&canonical, key);

        let url = self.config.endpoints.resolve(self.config.mode, operation);
        tracing::info!(
            operation = operation.name(),
            url = %url,
            tin = self.config.pin.as_str(),
            "dispatching device call"
        );

        let result = self
            .http
            .post(url)
            .timeout(timeout)
            .header("tin", self.config.pin.as_str())
            .header("bhfId", self.config.branch_id.as_str())
            .header("sign", signature.as_str())
            .json(payload)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => return transport_failure(operation, &e),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return transport_failure(operation, &e),
        };

        if !status.is_success() {
            let excerpt = excerpt(&body);
            tracing::warn!(
                operation = operation.name(),
                status = status.as_u16(),
                "device host returned HTTP error"
            );
            return CallOutcome::TransportError {
                kind: TransportErrorKind::HttpStatus {
                    status: status.as_u16(),
                },
                message: format!("HTTP {}: {excerpt}", status.as_u16()),
            };
        }

        let envelope: ResponseEnvelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(
                    operation = operation.name(),
                    error = %e,
                    "device response body is not a valid envelope"
                );
                return CallOutcome::TransportError {
                    kind: TransportErrorKind::MalformedResponse,
                    message: format!("unparseable device response: {}", excerpt(&body)),
                };
            }
        };

        if envelope.result_cd == RESULT_OK {
            tracing::debug!(operation = operation.name(), "device call succeeded");
            CallOutcome::Success {
                data: envelope.data.unwrap_or_default(),
            }
        } else {
            let message = if envelope.result_msg.is_empty() {
                "Unknown error".to_string()
            } else {
                envelope.result_msg
            };
            tracing::warn!(
                operation = operation.name(),
                code = %envelope.result_cd,
                message = %message,
                "device rejected the request"
            );
            CallOutcome::ApplicationError {
                code: envelope.result_cd,
                message,
                timestamp: envelope.result_dt,
            }
        }
    }
}

fn transport_failure(operation: Operation, e: &reqwest::Error) -> CallOutcome {
    let kind = if e.is_timeout() {
        TransportErrorKind::Timeout
    } else {
        TransportErrorKind::Connection
    };
    tracing::warn!(
        operation = operation.name(),
        kind = %kind,
        error = %e,
        "device call failed at transport level"
    );
    let message = match kind {
        TransportErrorKind::Timeout => {
            "the device host did not answer within the deadline".to_string()
        }
        _ => format!("connection error: {e}"),
    };
    CallOutcome::TransportError { kind, message }
}

fn excerpt(body: &str) -> String {
    if body.chars().count() <= BODY_EXCERPT_CHARS {
        body.to_string()
    } else {
        body.chars().take(BODY_EXCERPT_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_caps_long_bodies() {
        let long = "x".repeat(1000);
        assert_eq!(excerpt(&long).chars().count(), BODY_EXCERPT_CHARS);
        assert_eq!(excerpt("short"), "short");
    }

    #[test]
    fn envelope_parses_full_response() {
        let envelope: ResponseEnvelope = serde_json::from_str(
            r#"{"resultCd":"000","resultMsg":"Success","resultDt":"20241014120000","data":{"curRcptNo":7}}"#,
        )
        .unwrap();
        assert_eq!(envelope.result_cd, "000");
        assert_eq!(envelope.result_msg, "Success");
        assert_eq!(envelope.result_dt.as_deref(), Some("20241014120000"));
        assert_eq!(envelope.data.unwrap()["curRcptNo"], 7);
    }

    #[test]
    fn envelope_tolerates_missing_optional_fields() {
        let envelope: ResponseEnvelope =
            serde_json::from_str(r#"{"resultCd":"999"}"#).unwrap();
        assert_eq!(envelope.result_cd, "999");
        assert!(envelope.result_msg.is_empty());
        assert!(envelope.result_dt.is_none());
        assert!(envelope.data.is_none());
    }

    #[test]
    fn envelope_requires_result_code() {
        assert!(serde_json::from_str::<ResponseEnvelope>(r#"{"data":{}}"#).is_err());
    }
}
