//! # Wire Payload Construction
//!
//! Deterministic mapping from a [`FiscalDocument`] to the device submission
//! schema. The same document and sequence number always produce the same
//! payload, which in turn canonicalizes to the same signed bytes.

use serde_json::{json, Map, Value};

use vscu_core::{BranchId, KraPin};

use crate::document::{DocumentKind, FiscalDocument};

/// Build the submission payload for a document.
///
/// `sequence_no` is the caller-side document number drawn from
/// [`SequenceCounters`](crate::sequence::SequenceCounters). Classification
/// codes are expected to be present (pre-flight validation blocks
/// submission otherwise); absent codes render as empty strings.
pub fn build_submission_payload(
    document: &FiscalDocument,
    sequence_no: u64,
    pin: &KraPin,
    branch_id: &BranchId,
) -> Map<String, Value> {
    let confirm_dt = document.issued_at.to_wire();
    let sales_date = confirm_dt[..8].to_string();

    let items: Vec<Value> = document
        .lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let taxable = round2(line.line_total - line.tax_amount);
            json!({
                "itemSeq": idx + 1,
                "itemCd": line.item_code,
                "itemClsCd": line.classification.commodity_code.clone().unwrap_or_default(),
                "itemNm": line.description,
                "pkgUnitCd": line.classification.packaging_unit.clone().unwrap_or_default(),
                "qtyUnitCd": line.classification.quantity_unit.clone().unwrap_or_default(),
                "qty": line.quantity,
                "prc": line.unit_price,
                "splyAmt": taxable,
                "taxTyCd": line.tax_code,
                "taxblAmt": taxable,
                "taxAmt": line.tax_amount,
                "totAmt": line.line_total,
            })
        })
        .collect();

    let mut payload = Map::new();
    payload.insert("tin".into(), json!(pin.as_str()));
    payload.insert("bhfId".into(), json!(branch_id.as_str()));
    payload.insert("trdInvcNo".into(), json!(sequence_no));
    payload.insert("invcNo".into(), json!(sequence_no));
    payload.insert("salesTyCd".into(), json!("N"));
    payload.insert(
        "rcptTyCd".into(),
        json!(document.kind.receipt_type_code()),
    );
    payload.insert("salesDt".into(), json!(sales_date));
    payload.insert("cfmDt".into(), json!(confirm_dt));
    payload.insert("custNm".into(), json!(document.customer_name));
    if let Some(pin) = &document.customer_pin {
        payload.insert("custTin".into(), json!(pin.as_str()));
    }
    if document.kind == DocumentKind::CreditNote {
        let details = document.credit_note.clone().unwrap_or_default();
        payload.insert(
            "rfdRsnCd".into(),
            json!(details.reason_code.unwrap_or_default()),
        );
        payload.insert(
            "orgInvcNo".into(),
            json!(details.original_receipt_number.unwrap_or_default()),
        );
    }
    payload.insert("totItemCnt".into(), json!(document.lines.len()));
    payload.insert(
        "totTaxblAmt".into(),
        json!(round2(document.total_amount - document.total_tax)),
    );
    payload.insert("totTaxAmt".into(), json!(document.total_tax));
    payload.insert("totAmt".into(), json!(document.total_amount));
    payload.insert("itemList".into(), json!(items));

    payload
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
