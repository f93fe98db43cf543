//! The "vat" settings document: strict shape validation and the value
//! objects carried through rate resolution.
//!
//! Defaulting on tax configuration is a correctness hazard, so the
//! document is validated field by field before use. Errors name the
//! offending field path.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::VatError;

/// Validated contents of the settings document for group "vat".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VatSettings {
    /// The four configured rate slots. Each slot's `code` must exist in
    /// the active rate catalog.
    pub rates: RateSlots,
    /// Code of the rate applied when no other rule matches.
    pub default_rate: String,
    /// Informational only for this core — VIES checks happen elsewhere.
    pub vies_check_enabled: bool,
    /// Automatically apply the reversed rate to validated cross-border
    /// EU business customers.
    pub auto_reverse_b2b: bool,
    /// ISO 3166-1 alpha-2 code of the seller, upper-cased.
    pub seller_country_code: Option<String>,
    /// EU member states, upper-cased. Absent means the cross-border EU
    /// condition can never hold.
    pub eu_country_codes: Option<BTreeSet<String>>,
}

/// The four named rate slots of the settings document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSlots {
    pub high: RateSlot,
    pub low: RateSlot,
    pub zero: RateSlot,
    pub reversed: RateSlot,
}

/// One configured rate slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSlot {
    pub percentage: Decimal,
    pub name: String,
    pub code: String,
}

/// Customer facts relevant to rate selection, passed per calculation.
/// Not persisted by this crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerVatInfo {
    pub is_business_customer: bool,
    pub vat_number: Option<String>,
    /// Whether the VAT number passed validation (VIES or manual).
    pub vat_number_validated: bool,
    /// Manual reverse-charge override set on the customer record.
    pub vat_reversed: bool,
    pub vat_exempt: bool,
    pub country_id: Option<i64>,
}

/// Per-sale context for the cross-border EU decision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleContext {
    /// ISO 3166-1 alpha-2 destination country, any case.
    pub destination_country: Option<String>,
}

/// Validate a raw settings document against the required shape.
///
/// Every rate slot must carry a numeric `percentage`, string `name`,
/// and string `code`; `defaultRate`, `viesCheckEnabled`, and
/// `autoReverseB2B` must be present with the correct types. Anything
/// less fails with [`VatError::Configuration`] — never a partial parse.
pub fn parse_settings(doc: &Value) -> Result<VatSettings, VatError> {
    let root = require_object(doc, "settings")?;

    let rates_value = root
        .get("rates")
        .ok_or_else(|| missing("settings.rates"))?;
    let rates_obj = require_object(rates_value, "settings.rates")?;
    let rates = RateSlots {
        high: parse_slot(rates_obj, "high")?,
        low: parse_slot(rates_obj, "low")?,
        zero: parse_slot(rates_obj, "zero")?,
        reversed: parse_slot(rates_obj, "reversed")?,
    };

    let default_rate = require_string(root, "defaultRate", "settings.defaultRate")?;
    let vies_check_enabled = require_bool(root, "viesCheckEnabled", "settings.viesCheckEnabled")?;
    let auto_reverse_b2b = require_bool(root, "autoReverseB2B", "settings.autoReverseB2B")?;

    let seller_country_code = match root.get("sellerCountryCode") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.to_uppercase()),
        Some(other) => {
            return Err(wrong_type("settings.sellerCountryCode", "a string", other));
        }
    };

    let eu_country_codes = match root.get("euCountryCodes") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => {
            let mut codes = BTreeSet::new();
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::String(s) => {
                        codes.insert(s.to_uppercase());
                    }
                    other => {
                        return Err(wrong_type(
                            &format!("settings.euCountryCodes[{i}]"),
                            "a string",
                            other,
                        ));
                    }
                }
            }
            Some(codes)
        }
        Some(other) => {
            return Err(wrong_type("settings.euCountryCodes", "an array", other));
        }
    };

    Ok(VatSettings {
        rates,
        default_rate,
        vies_check_enabled,
        auto_reverse_b2b,
        seller_country_code,
        eu_country_codes,
    })
}

fn parse_slot(
    rates: &serde_json::Map<String, Value>,
    slot: &str,
) -> Result<RateSlot, VatError> {
    let path = format!("settings.rates.{slot}");
    let value = rates.get(slot).ok_or_else(|| missing(&path))?;
    let obj = require_object(value, &path)?;

    let percentage = require_decimal(obj, "percentage", &format!("{path}.percentage"))?;
    if percentage < Decimal::ZERO {
        return Err(VatError::Configuration(format!(
            "settings field '{path}.percentage' must not be negative, got {percentage}"
        )));
    }
    let name = require_string(obj, "name", &format!("{path}.name"))?;
    let code = require_string(obj, "code", &format!("{path}.code"))?;

    Ok(RateSlot {
        percentage,
        name,
        code,
    })
}

fn missing(path: &str) -> VatError {
    VatError::Configuration(format!("settings field '{path}' is missing"))
}

fn wrong_type(path: &str, expected: &str, got: &Value) -> VatError {
    let kind = match got {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    VatError::Configuration(format!(
        "settings field '{path}' must be {expected}, got {kind}"
    ))
}

fn require_object<'a>(
    value: &'a Value,
    path: &str,
) -> Result<&'a serde_json::Map<String, Value>, VatError> {
    value
        .as_object()
        .ok_or_else(|| wrong_type(path, "an object", value))
}

fn require_string(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<String, VatError> {
    let value = obj.get(key).ok_or_else(|| missing(path))?;
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| wrong_type(path, "a string", value))
}

fn require_bool(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<bool, VatError> {
    let value = obj.get(key).ok_or_else(|| missing(path))?;
    value
        .as_bool()
        .ok_or_else(|| wrong_type(path, "a boolean", value))
}

fn require_decimal(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Decimal, VatError> {
    let value = obj.get(key).ok_or_else(|| missing(path))?;
    let number = value
        .as_number()
        .ok_or_else(|| wrong_type(path, "a number", value))?;
    // Round-trip through the JSON text so 9.5 stays exactly 9.5.
    number.to_string().parse().map_err(|_| {
        VatError::Configuration(format!(
            "settings field '{path}' is not a representable decimal: {number}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn valid_doc() -> Value {
        json!({
            "rates": {
                "high": { "percentage": 21, "name": "Hoog tarief", "code": "HIGH" },
                "low": { "percentage": 9, "name": "Laag tarief", "code": "LOW" },
                "zero": { "percentage": 0, "name": "Nultarief", "code": "ZERO" },
                "reversed": { "percentage": 0, "name": "BTW verlegd", "code": "REVERSED" },
            },
            "defaultRate": "HIGH",
            "viesCheckEnabled": false,
            "autoReverseB2B": true,
            "sellerCountryCode": "nl",
            "euCountryCodes": ["nl", "DE", "be"],
        })
    }

    #[test]
    fn valid_document_parses() {
        let settings = parse_settings(&valid_doc()).unwrap();
        assert_eq!(settings.rates.high.percentage, dec!(21));
        assert_eq!(settings.rates.low.code, "LOW");
        assert_eq!(settings.default_rate, "HIGH");
        assert!(settings.auto_reverse_b2b);
    }

    #[test]
    fn country_codes_are_uppercased() {
        let settings = parse_settings(&valid_doc()).unwrap();
        assert_eq!(settings.seller_country_code.as_deref(), Some("NL"));
        let eu = settings.eu_country_codes.unwrap();
        assert!(eu.contains("NL"));
        assert!(eu.contains("BE"));
        assert!(!eu.contains("nl"));
    }

    #[test]
    fn fractional_percentage_is_exact() {
        let mut doc = valid_doc();
        doc["rates"]["low"]["percentage"] = json!(9.5);
        let settings = parse_settings(&doc).unwrap();
        assert_eq!(settings.rates.low.percentage, dec!(9.5));
    }

    #[test]
    fn missing_slot_is_rejected() {
        let mut doc = valid_doc();
        doc["rates"].as_object_mut().unwrap().remove("reversed");
        let err = parse_settings(&doc).unwrap_err();
        assert!(err.to_string().contains("settings.rates.reversed"));
    }

    #[test]
    fn string_percentage_is_rejected() {
        let mut doc = valid_doc();
        doc["rates"]["high"]["percentage"] = json!("21");
        let err = parse_settings(&doc).unwrap_err();
        assert!(err.to_string().contains("settings.rates.high.percentage"));
        assert!(err.to_string().contains("must be a number"));
    }

    #[test]
    fn negative_percentage_is_rejected() {
        let mut doc = valid_doc();
        doc["rates"]["high"]["percentage"] = json!(-1);
        let err = parse_settings(&doc).unwrap_err();
        assert!(err.to_string().contains("must not be negative"));
    }

    #[test]
    fn missing_default_rate_is_rejected() {
        let mut doc = valid_doc();
        doc.as_object_mut().unwrap().remove("defaultRate");
        let err = parse_settings(&doc).unwrap_err();
        assert!(err.to_string().contains("settings.defaultRate"));
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let mut doc = valid_doc();
        doc.as_object_mut().unwrap().remove("sellerCountryCode");
        doc.as_object_mut().unwrap().remove("euCountryCodes");
        let settings = parse_settings(&doc).unwrap();
        assert!(settings.seller_country_code.is_none());
        assert!(settings.eu_country_codes.is_none());
    }

    #[test]
    fn non_object_document_is_rejected() {
        let err = parse_settings(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, VatError::Configuration(_)));
    }
}
