// src/normalizer.rs

use crate::error::ReportError;
use crate::report::{Bale, BaleSlot, HeaderField, Measurement, Report, percent_of, zero_bale};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// A schema-conformant report together with its serialized form, since the
/// page needs both.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedReport {
    pub report: Report,
    pub json: String,
}

impl NormalizedReport {
    pub fn new(report: Report) -> Self {
        let json = report.to_json();
        Self { report, json }
    }
}

/// Reconcile decoded model output against the report schema.
///
/// `None` stands for output that failed to decode. Anything without a
/// `bales` object is replaced by the default report, keeping only the header
/// fields it carried. Otherwise every bale is filled up to the twelve
/// measurements and, when it has a positive weight, given percentage fields.
///
/// Only a `bales` entry that is present but shaped wrong is an error.
pub fn normalize(decoded: Option<Value>) -> Result<NormalizedReport, ReportError> {
    let report = match decoded {
        Some(Value::Object(map)) if map.contains_key("bales") => repair(map)?,
        other => {
            info!("No bale data in model output, using default report");
            default_report(other.as_ref().and_then(Value::as_object))
        }
    };
    Ok(NormalizedReport::new(report))
}

/// The fallback report: salvaged headers and two all-zero bales without
/// percentage fields.
pub fn default_report(fallback: Option<&Map<String, Value>>) -> Report {
    let mut map = Map::new();
    for field in HeaderField::ALL {
        map.insert(field.key().to_string(), field.salvage(fallback));
    }

    let bales: Map<String, Value> = BaleSlot::ALL
        .into_iter()
        .map(|slot| (slot.key().to_string(), Value::Object(zero_bale())))
        .collect();
    map.insert("bales".to_string(), Value::Object(bales));

    Report::from(map)
}

fn repair(mut map: Map<String, Value>) -> Result<Report, ReportError> {
    let bales = map
        .get_mut("bales")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| ReportError::MalformedBales("'bales' is not an object".to_string()))?;

    for slot in BaleSlot::ALL {
        let bale = bales
            .get_mut(slot.key())
            .and_then(Value::as_object_mut)
            .ok_or_else(|| {
                ReportError::MalformedBales(format!("'{}' is missing or not an object", slot.key()))
            })?;

        for m in Measurement::ALL {
            bale.entry(m.key()).or_insert_with(|| Value::from(0.0));
        }

        // Unlike the correction form, an empty bale gets no percentage
        // fields here at all.
        let weight = number(bale, slot, Measurement::BaleWeight)?;
        if weight > 0.0 {
            for m in Measurement::contaminants() {
                let value = number(bale, slot, m)?;
                bale.insert(m.percent_key(), Value::from(percent_of(value, weight)));
            }
        }
        debug!(slot = slot.key(), weight, fields = bale.len(), "Bale repaired");
    }

    Ok(Report::from(map))
}

fn number(bale: &Bale, slot: BaleSlot, m: Measurement) -> Result<f64, ReportError> {
    bale.get(m.key())
        .and_then(Value::as_f64)
        .ok_or(ReportError::NonNumericMeasurement {
            slot: slot.key(),
            key: m.key(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response_parser::parse_response;
    use serde_json::json;

    fn bale(report: &Report, slot: BaleSlot) -> &Bale {
        report.bale(slot).expect("bale present")
    }

    #[test]
    fn test_missing_keys_filled_with_zero() {
        let input = json!({
            "party_name": "Acme",
            "bales": {
                "bale1": {"bale_weight": 0.0, "pvc": 3.5},
                "bale2": {}
            }
        });
        let out = normalize(Some(input)).unwrap();

        for slot in BaleSlot::ALL {
            let b = bale(&out.report, slot);
            for m in Measurement::ALL {
                assert!(b.contains_key(m.key()), "{} missing {}", slot.key(), m.key());
            }
        }
        assert_eq!(bale(&out.report, BaleSlot::Bale1)["pvc"], json!(3.5));
        assert_eq!(bale(&out.report, BaleSlot::Bale1)["metal"], json!(0.0));
        assert_eq!(bale(&out.report, BaleSlot::Bale2)["moisture"], json!(0.0));
    }

    #[test]
    fn test_percentages_for_positive_weight() {
        let input = json!({
            "bales": {
                "bale1": {"bale_weight": 250, "pvc": 20, "metal": 2.5, "moisture": 10.0},
                "bale2": {"bale_weight": 80.0, "colour": 8.0}
            }
        });
        let out = normalize(Some(input)).unwrap();
        let b1 = bale(&out.report, BaleSlot::Bale1);
        let b2 = bale(&out.report, BaleSlot::Bale2);

        let pct = |b: &Bale, key: &str| b[key].as_f64().unwrap();
        assert!((pct(b1, "pvc_percent") - 8.0).abs() < 1e-9);
        assert!((pct(b1, "metal_percent") - 1.0).abs() < 1e-9);
        assert!((pct(b1, "moisture_percent") - 4.0).abs() < 1e-9);
        assert!((pct(b1, "tar_raffiya_percent")).abs() < 1e-9);
        assert!((pct(b2, "colour_percent") - 10.0).abs() < 1e-9);
        assert!(!b1.contains_key("bale_weight_percent"));
        assert_eq!(b1.len(), 12 + 11);
    }

    #[test]
    fn test_zero_weight_gets_no_percentages() {
        let input = json!({
            "bales": {
                "bale1": {"bale_weight": 0, "pvc": 5},
                "bale2": {"bale_weight": 100, "pvc": 5}
            }
        });
        let out = normalize(Some(input)).unwrap();

        let b1 = bale(&out.report, BaleSlot::Bale1);
        assert!(Measurement::contaminants().all(|m| !b1.contains_key(&m.percent_key())));
        assert!(bale(&out.report, BaleSlot::Bale2).contains_key("pvc_percent"));
    }

    #[test]
    fn test_decode_failure_gives_default_report() {
        let decoded = parse_response("not json").ok();
        let out = normalize(decoded).unwrap();

        assert_eq!(out.report.get("party_name"), Some(&json!("Unknown Party")));
        assert_eq!(out.report.get("vehicle"), Some(&json!("Unknown Vehicle")));
        assert_eq!(out.report.get("date"), Some(&json!("01/01/2025")));
        assert_eq!(out.report.get("bill_number"), Some(&json!(0)));
        for slot in BaleSlot::ALL {
            assert_eq!(bale(&out.report, slot), &zero_bale());
        }
        assert_eq!(out.report, default_report(None));
    }

    #[test]
    fn test_headers_salvaged_without_bales() {
        let input = json!({"party_name": "Acme", "bill_number": 42, "extra": true});
        let out = normalize(Some(input)).unwrap();

        assert_eq!(out.report.get("party_name"), Some(&json!("Acme")));
        assert_eq!(out.report.get("bill_number"), Some(&json!(42)));
        assert_eq!(out.report.get("vehicle"), Some(&json!("Unknown Vehicle")));
        assert_eq!(out.report.get("extra"), None);
        assert_eq!(bale(&out.report, BaleSlot::Bale1).len(), 12);
    }

    #[test]
    fn test_non_object_input_gives_default_report() {
        for input in [Value::Null, json!([1, 2, 3]), json!("bales"), json!({})] {
            let out = normalize(Some(input)).unwrap();
            assert_eq!(out.report, default_report(None));
        }
    }

    #[test]
    fn test_wrong_types_pass_through() {
        let input = json!({
            "party_name": 17,
            "bales": {
                "bale1": {"bale_weight": 0, "pvc": "lots"},
                "bale2": {"bale_weight": 0}
            }
        });
        let out = normalize(Some(input)).unwrap();

        assert_eq!(out.report.get("party_name"), Some(&json!(17)));
        assert_eq!(bale(&out.report, BaleSlot::Bale1)["pvc"], json!("lots"));
        // Headers absent from the input are not defaulted on this path.
        assert_eq!(out.report.get("vehicle"), None);
    }

    #[test]
    fn test_malformed_bales_are_errors() {
        let not_object = json!({"bales": [1, 2]});
        assert!(matches!(
            normalize(Some(not_object)),
            Err(ReportError::MalformedBales(_))
        ));

        let missing_slot = json!({"bales": {"bale1": {}}});
        assert!(matches!(
            normalize(Some(missing_slot)),
            Err(ReportError::MalformedBales(_))
        ));

        let text_weight = json!({"bales": {"bale1": {"bale_weight": "100"}, "bale2": {}}});
        assert!(matches!(
            normalize(Some(text_weight)),
            Err(ReportError::NonNumericMeasurement { slot: "bale1", key: "bale_weight" })
        ));
    }

    #[test]
    fn test_json_matches_report() {
        let out = normalize(None).unwrap();
        let reparsed: Value = serde_json::from_str(&out.json).unwrap();
        assert_eq!(reparsed, serde_json::to_value(&out.report).unwrap());
    }
}
