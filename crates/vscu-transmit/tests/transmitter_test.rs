//! End-to-end tests for `Transmitter` against a wiremock device host.
//!
//! Exercises the submission contract: confirmation writes the full
//! transmission record, rejection and transport failure leave the document
//! untouched, the idempotence guard and validation failures never reach the
//! network, and simulation mode produces a confirmed document offline.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{any, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vscu_client::{
    DeviceClient, DeviceConfig, DeviceMode, EndpointRegistry, TransportErrorKind,
};
use vscu_core::{BranchId, DocumentId, KraPin};
use vscu_crypto::SigningKey;
use vscu_transmit::{
    CodeFetchOutcome, CreditNoteDetails, DocumentKind, DocumentLine, DocumentState,
    FiscalDocument, ItemClassification, ItemRegistration, MasterDataOutcome,
    SubmissionOutcome, Transmitter,
};

fn transmitter_for(server: &MockServer) -> Transmitter {
    transmitter_with_timeout(server, Duration::from_secs(5))
}

fn transmitter_with_timeout(server: &MockServer, timeout: Duration) -> Transmitter {
    let registry = EndpointRegistry::new(server.uri().parse().unwrap());
    let config = DeviceConfig::new(
        KraPin::new("P052386110T").unwrap(),
        BranchId::default(),
        DeviceMode::Production,
        Some(SigningKey::new("test-cmc-key").unwrap()),
        registry,
    )
    .unwrap()
    .with_timeout(timeout);
    Transmitter::new(DeviceClient::new(config).unwrap())
}

fn classified_line() -> DocumentLine {
    DocumentLine {
        item_code: "WID-1".to_string(),
        description: "Widget".to_string(),
        quantity: 2.0,
        unit_price: 500.0,
        tax_code: "B".to_string(),
        tax_rate: 16.0,
        tax_amount: 160.0,
        line_total: 1160.0,
        classification: ItemClassification {
            commodity_code: Some("43211508".to_string()),
            packaging_unit: Some("CT".to_string()),
            quantity_unit: Some("U".to_string()),
        },
    }
}

fn invoice() -> FiscalDocument {
    let mut doc = FiscalDocument::new(DocumentId::new(), DocumentKind::SalesInvoice);
    doc.customer_name = "Acme Ltd".to_string();
    doc.customer_pin = Some(KraPin::new("A123456789Z").unwrap());
    doc.total_amount = 1160.0;
    doc.total_tax = 160.0;
    doc.lines = vec![classified_line()];
    doc
}

fn confirmation_body() -> serde_json::Value {
    json!({
        "resultCd": "000",
        "resultMsg": "Success",
        "resultDt": "20241014120000",
        "data": {
            "curRcptNo": 7,
            "invcNo": 7,
            "rcptSign": "ABCD1234EFGH5678",
            "sdcDateTime": "20241014120000",
            "intrlData": "SU5URVJOQUw="
        }
    })
}

#[tokio::test]
async fn confirmation_writes_record_and_state_together() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/saveTrnsSalesOsdc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(confirmation_body()))
        .expect(1)
        .mount(&server)
        .await;

    let transmitter = transmitter_for(&server);
    let mut doc = invoice();
    let outcome = transmitter.submit(&mut doc).await;

    assert_eq!(outcome, SubmissionOutcome::Confirmed { receipt_number: 7 });
    assert_eq!(doc.state(), DocumentState::Confirmed);

    let record = doc.transmission().unwrap();
    assert_eq!(record.receipt_number, 7);
    assert_eq!(record.receipt_signature, "ABCD1234EFGH5678");
    assert_eq!(record.confirmed_at.to_wire(), "20241014120000");
    assert_eq!(record.internal_data, "SU5URVJOQUw=");

    let (message, severity) = outcome.report();
    assert!(message.contains('7'));
    assert_eq!(severity, vscu_transmit::NoticeSeverity::Info);
}

#[tokio::test]
async fn remote_rejection_leaves_document_unconfirmed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/saveTrnsSalesOsdc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resultCd": "999",
            "resultMsg": "Invalid TIN",
            "resultDt": "20241014120000"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transmitter = transmitter_for(&server);
    let mut doc = invoice();
    let outcome = transmitter.submit(&mut doc).await;

    let SubmissionOutcome::RemoteRejected { code, message } = outcome else {
        panic!("expected remote rejection, got {outcome:?}");
    };
    assert_eq!(code, "999");
    assert_eq!(message, "Invalid TIN");
    assert_eq!(doc.state(), DocumentState::Pending);
    assert!(doc.transmission().is_none());
}

#[tokio::test]
async fn timeout_is_retryable_and_leaves_document_unconfirmed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/saveTrnsSalesOsdc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(confirmation_body())
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transmitter = transmitter_with_timeout(&server, Duration::from_millis(100));
    let mut doc = invoice();
    let outcome = transmitter.submit(&mut doc).await;

    let SubmissionOutcome::TransportFailed { kind, .. } = &outcome else {
        panic!("expected transport failure, got {outcome:?}");
    };
    assert_eq!(*kind, TransportErrorKind::Timeout);
    assert_eq!(doc.state(), DocumentState::Pending);

    let (message, _) = outcome.report();
    assert!(message.contains("safe to retry"));
}

#[tokio::test]
async fn retry_after_transport_failure_is_permitted() {
    // First host never answers usefully; second host confirms. The guard
    // must not block the second attempt.
    let dead = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&dead)
        .await;

    let live = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/saveTrnsSalesOsdc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(confirmation_body()))
        .expect(1)
        .mount(&live)
        .await;

    let mut doc = invoice();

    let first = transmitter_for(&dead).submit(&mut doc).await;
    assert!(matches!(first, SubmissionOutcome::TransportFailed { .. }));
    assert_eq!(doc.state(), DocumentState::Pending);

    let second = transmitter_for(&live).submit(&mut doc).await;
    assert!(matches!(second, SubmissionOutcome::Confirmed { .. }));
    assert_eq!(doc.state(), DocumentState::Confirmed);
}

#[tokio::test]
async fn confirmed_document_is_never_resubmitted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/saveTrnsSalesOsdc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(confirmation_body()))
        .expect(1)
        .mount(&server)
        .await;

    let transmitter = transmitter_for(&server);
    let mut doc = invoice();

    assert!(matches!(
        transmitter.submit(&mut doc).await,
        SubmissionOutcome::Confirmed { .. }
    ));

    // Both resubmissions are refused locally; the mock's expect(1) verifies
    // the device saw exactly one request.
    assert_eq!(
        transmitter.submit(&mut doc).await,
        SubmissionOutcome::AlreadyTransmitted
    );
    assert_eq!(
        transmitter.submit(&mut doc).await,
        SubmissionOutcome::AlreadyTransmitted
    );

    server.verify().await;
}

#[tokio::test]
async fn missing_classification_codes_fail_before_any_network_call() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let transmitter = transmitter_for(&server);
    let mut doc = invoice();
    doc.lines[0].classification = ItemClassification::default();

    let outcome = transmitter.submit(&mut doc).await;
    let SubmissionOutcome::Invalid(messages) = outcome else {
        panic!("expected validation failure, got {outcome:?}");
    };
    assert!(!messages.is_empty());
    assert!(messages.iter().all(|m| !m.message.is_empty()));
    assert!(messages.iter().any(|m| m.rule == "commodity-code-missing"));
    assert_eq!(doc.state(), DocumentState::Pending);

    server.verify().await;
}

#[tokio::test]
async fn credit_note_travels_sales_endpoint_with_refund_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/saveTrnsSalesOsdc"))
        .and(body_partial_json(json!({
            "rcptTyCd": "R",
            "rfdRsnCd": "06",
            "orgInvcNo": 41
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(confirmation_body()))
        .expect(1)
        .mount(&server)
        .await;

    let transmitter = transmitter_for(&server);
    let mut doc = invoice();
    doc.kind = DocumentKind::CreditNote;
    doc.credit_note = Some(CreditNoteDetails {
        original_receipt_number: Some(41),
        reason_code: Some("06".to_string()),
    });

    assert!(matches!(
        transmitter.submit(&mut doc).await,
        SubmissionOutcome::Confirmed { .. }
    ));
}

#[tokio::test]
async fn credit_note_without_reason_is_blocked_at_submission() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let transmitter = transmitter_for(&server);
    let mut doc = invoice();
    doc.kind = DocumentKind::CreditNote;
    doc.credit_note = Some(CreditNoteDetails {
        original_receipt_number: Some(41),
        reason_code: None,
    });

    let outcome = transmitter.submit(&mut doc).await;
    let SubmissionOutcome::Invalid(messages) = outcome else {
        panic!("expected validation failure, got {outcome:?}");
    };
    assert!(messages
        .iter()
        .any(|m| m.rule == "credit-note-reason-missing"));

    server.verify().await;
}

#[tokio::test]
async fn simulation_mode_confirms_documents_offline() {
    let config = DeviceConfig::new(
        KraPin::new("P052386110T").unwrap(),
        BranchId::default(),
        DeviceMode::Simulation,
        None,
        EndpointRegistry::published(),
    )
    .unwrap();
    let transmitter = Transmitter::new(DeviceClient::new(config).unwrap());

    let mut doc = invoice();
    let outcome = transmitter.submit(&mut doc).await;

    assert!(matches!(outcome, SubmissionOutcome::Confirmed { .. }));
    assert_eq!(doc.state(), DocumentState::Confirmed);
    assert!(doc
        .transmission()
        .unwrap()
        .receipt_signature
        .starts_with("DEMO"));

    // The synthetic receipt trips the same idempotence guard as a real one.
    assert_eq!(
        transmitter.submit(&mut doc).await,
        SubmissionOutcome::AlreadyTransmitted
    );
}

#[tokio::test]
async fn register_item_round_trips_master_data() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/saveItem"))
        .and(body_partial_json(json!({ "itemCd": "KE1NTXU0000001" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resultCd": "000",
            "resultMsg": "Success",
            "data": { "itemCd": "KE1NTXU0000001" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transmitter = transmitter_for(&server);
    let item = ItemRegistration {
        item_code: "KE1NTXU0000001".to_string(),
        item_name: "Widget".to_string(),
        item_type_code: "2".to_string(),
        commodity_code: "43211508".to_string(),
        packaging_unit: "CT".to_string(),
        quantity_unit: "U".to_string(),
        origin_country_code: "KE".to_string(),
        default_price: 500.0,
        insurance_applicable: false,
    };

    let MasterDataOutcome::Accepted { data } = transmitter.register_item(&item).await else {
        panic!("expected acceptance");
    };
    assert_eq!(data["itemCd"], "KE1NTXU0000001");
}

#[tokio::test]
async fn fetch_codes_parses_nested_code_tables() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/selectCodeList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resultCd": "000",
            "resultMsg": "Success",
            "data": {
                "clsList": [{
                    "cdCls": "17",
                    "dtlList": [
                        {"cd": "CT", "cdNm": "Carton"},
                        {"cd": "BG", "cdNm": "Bag"}
                    ]
                }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transmitter = transmitter_for(&server);
    let CodeFetchOutcome::Fetched(codes) = transmitter.fetch_codes().await else {
        panic!("expected fetched codes");
    };
    assert_eq!(codes.len(), 2);
    assert_eq!(codes[0].code_type, "17");
    assert_eq!(codes[0].code, "CT");
}

#[tokio::test]
async fn fetch_codes_surfaces_remote_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/selectCodeList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resultCd": "890",
            "resultMsg": "Device not initialized"
        })))
        .mount(&server)
        .await;

    let transmitter = transmitter_for(&server);
    let outcome = transmitter.fetch_codes().await;
    assert_eq!(
        outcome,
        CodeFetchOutcome::Rejected {
            code: "890".to_string(),
            message: "Device not initialized".to_string(),
        }
    );
}
