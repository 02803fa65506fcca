//! # Master Data Transfer Objects
//!
//! Item and customer registration records, plus the device code tables.
//! These travel the same transport as documents but carry no lifecycle
//! state — a registration is either accepted or it is not.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use vscu_core::{BranchId, KraPin};

/// An item master record to register with the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRegistration {
    /// Caller-side item code.
    pub item_code: String,
    /// Item display name.
    pub item_name: String,
    /// Opaque item type code (raw material / finished product / service).
    pub item_type_code: String,
    /// Commodity classification code.
    pub commodity_code: String,
    /// Packaging unit code.
    pub packaging_unit: String,
    /// Quantity unit code.
    pub quantity_unit: String,
    /// ISO country code of origin.
    pub origin_country_code: String,
    /// Default unit price.
    pub default_price: f64,
    /// Whether the item is covered by insurance.
    pub insurance_applicable: bool,
}

impl ItemRegistration {
    /// Render the registration in the device schema.
    pub fn to_payload(&self, pin: &KraPin, branch_id: &BranchId) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("tin".into(), json!(pin.as_str()));
        payload.insert("bhfId".into(), json!(branch_id.as_str()));
        payload.insert("itemCd".into(), json!(self.item_code));
        payload.insert("itemClsCd".into(), json!(self.commodity_code));
        payload.insert("itemNm".into(), json!(self.item_name));
        payload.insert("itemTyCd".into(), json!(self.item_type_code));
        payload.insert("pkgUnitCd".into(), json!(self.packaging_unit));
        payload.insert("qtyUnitCd".into(), json!(self.quantity_unit));
        payload.insert("orgnNatCd".into(), json!(self.origin_country_code));
        payload.insert("dftPrc".into(), json!(self.default_price));
        payload.insert(
            "isrcAplcbYn".into(),
            json!(if self.insurance_applicable { "Y" } else { "N" }),
        );
        payload.insert("useYn".into(), json!("Y"));
        payload
    }
}

/// A customer master record to register with the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRegistration {
    /// Caller-side customer number.
    pub customer_number: String,
    /// Customer tax identifier, when known.
    pub customer_pin: Option<KraPin>,
    /// Customer display name.
    pub customer_name: String,
}

impl CustomerRegistration {
    /// Render the registration in the device schema.
    pub fn to_payload(&self, pin: &KraPin, branch_id: &BranchId) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("tin".into(), json!(pin.as_str()));
        payload.insert("bhfId".into(), json!(branch_id.as_str()));
        payload.insert("custNo".into(), json!(self.customer_number));
        if let Some(customer_pin) = &self.customer_pin {
            payload.insert("custTin".into(), json!(customer_pin.as_str()));
        }
        payload.insert("custNm".into(), json!(self.customer_name));
        payload.insert("useYn".into(), json!("Y"));
        payload
    }
}

/// One entry of the device code tables. Code values are opaque — the bridge
/// relays them, it does not interpret them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCode {
    /// Code class (e.g. packaging units vs. tax types).
    pub code_type: String,
    /// The code value.
    pub code: String,
    /// Human-readable name.
    pub name: String,
}

/// Extract device codes from a code-list response payload.
///
/// Tolerates both shapes the device is known to emit: a flat list of
/// `{cdCls, cd, cdNm}` entries and a class list whose entries nest their
/// codes under `dtlList`.
pub(crate) fn parse_code_list(data: &Map<String, Value>) -> Vec<DeviceCode> {
    let entries = data
        .get("codeList")
        .or_else(|| data.get("clsList"))
        .and_then(Value::as_array);
    let Some(entries) = entries else {
        return Vec::new();
    };

    let mut codes = Vec::new();
    for entry in entries {
        let code_type = text(entry, "cdCls");
        match entry.get("dtlList").and_then(Value::as_array) {
            Some(details) => {
                for detail in details {
                    codes.push(DeviceCode {
                        code_type: code_type.clone(),
                        code: text(detail, "cd"),
                        name: text(detail, "cdNm"),
                    });
                }
            }
            None => codes.push(DeviceCode {
                code_type,
                code: text(entry, "cd"),
                name: text(entry, "cdNm"),
            }),
        }
    }
    codes
}

fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin() -> KraPin {
        KraPin::new("P052386110T").unwrap()
    }

    #[test]
    fn item_payload_covers_device_schema() {
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
        let payload = item.to_payload(&pin(), &BranchId::default());
        assert_eq!(payload["itemCd"], "KE1NTXU0000001");
        assert_eq!(payload["itemClsCd"], "43211508");
        assert_eq!(payload["itemTyCd"], "2");
        assert_eq!(payload["isrcAplcbYn"], "N");
        assert_eq!(payload["useYn"], "Y");
    }

    #[test]
    fn customer_payload_omits_absent_tin() {
        let customer = CustomerRegistration {
            customer_number: "C-001".to_string(),
            customer_pin: None,
            customer_name: "Walk-in".to_string(),
        };
        let payload = customer.to_payload(&pin(), &BranchId::default());
        assert!(!payload.contains_key("custTin"));
        assert_eq!(payload["custNm"], "Walk-in");
    }

    #[test]
    fn parse_code_list_reads_flat_entries() {
        let Value::Object(data) = json!({
            "codeList": [
                {"cdCls": "17", "cd": "CT", "cdNm": "Carton"},
                {"cdCls": "17", "cd": "BG", "cdNm": "Bag"},
            ]
        }) else {
            unreachable!()
        };
        let codes = parse_code_list(&data);
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[0].code_type, "17");
        assert_eq!(codes[0].code, "CT");
        assert_eq!(codes[1].name, "Bag");
    }

    #[test]
    fn parse_code_list_reads_nested_class_entries() {
        let Value::Object(data) = json!({
            "clsList": [{
                "cdCls": "04",
                "dtlList": [
                    {"cd": "B", "cdNm": "VAT 16%"},
                    {"cd": "E", "cdNm": "Exempt"},
                ]
            }]
        }) else {
            unreachable!()
        };
        let codes = parse_code_list(&data);
        assert_eq!(codes.len(), 2);
        assert!(codes.iter().all(|c| c.code_type == "04"));
        assert_eq!(codes[1].code, "E");
    }

    #[test]
    fn parse_code_list_tolerates_missing_list() {
        let codes = parse_code_list(&Map::new());
        assert!(codes.is_empty());
    }
}
