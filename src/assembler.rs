// src/assembler.rs

use crate::error::ReportError;
use crate::report::{Bale, BaleSlot, HeaderField};
use serde::Serialize;
use serde_json::Value;

/// Everything the printable document shows. Bales are passed through as
/// they arrived, with or without percentage fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentContext {
    pub party_name: Value,
    pub vehicle: Value,
    pub date: Value,
    pub bill_number: Value,
    pub bale1: Bale,
    pub bale2: Bale,
}

impl DocumentContext {
    pub fn bale(&self, slot: BaleSlot) -> &Bale {
        match slot {
            BaleSlot::Bale1 => &self.bale1,
            BaleSlot::Bale2 => &self.bale2,
        }
    }

    pub fn header(&self, field: HeaderField) -> &Value {
        match field {
            HeaderField::PartyName => &self.party_name,
            HeaderField::Vehicle => &self.vehicle,
            HeaderField::Date => &self.date,
            HeaderField::BillNumber => &self.bill_number,
        }
    }
}

/// Map a decoded report onto the document fields, defaulting absent headers.
pub fn assemble(raw: &Value) -> Result<DocumentContext, ReportError> {
    let map = raw
        .as_object()
        .filter(|m| m.contains_key("bales"))
        .ok_or(ReportError::InvalidReportFormat)?;

    let bales = map
        .get("bales")
        .and_then(Value::as_object)
        .ok_or_else(|| ReportError::MalformedBales("'bales' is not an object".to_string()))?;

    let bale = |slot: BaleSlot| -> Result<Bale, ReportError> {
        match bales.get(slot.key()) {
            None => Ok(Bale::new()),
            Some(Value::Object(b)) => Ok(b.clone()),
            Some(_) => Err(ReportError::MalformedBales(format!(
                "'{}' is not an object",
                slot.key()
            ))),
        }
    };

    Ok(DocumentContext {
        party_name: HeaderField::PartyName.salvage(Some(map)),
        vehicle: HeaderField::Vehicle.salvage(Some(map)),
        date: HeaderField::Date.salvage(Some(map)),
        bill_number: HeaderField::BillNumber.salvage(Some(map)),
        bale1: bale(BaleSlot::Bale1)?,
        bale2: bale(BaleSlot::Bale2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_bales() {
        let err = assemble(&json!({"party_name": "Acme"})).unwrap_err();
        assert!(matches!(err, ReportError::InvalidReportFormat));
        assert_eq!(
            err.to_string(),
            "Invalid report format. 'bales' section is missing. Please ensure the input contains bale data."
        );
    }

    #[test]
    fn test_not_an_object() {
        for raw in [json!(null), json!([{"bales": {}}]), json!("bales")] {
            assert!(matches!(assemble(&raw), Err(ReportError::InvalidReportFormat)));
        }
    }

    #[test]
    fn test_exactly_six_fields() {
        let raw = json!({
            "party_name": "Acme",
            "bill_number": 42,
            "notes": "dropped",
            "bales": {
                "bale1": {"bale_weight": 100, "pvc": 20, "pvc_percent": 20.0},
                "bale2": {"bale_weight": 0}
            }
        });
        let doc = assemble(&raw).unwrap();
        let value = serde_json::to_value(&doc).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();

        assert_eq!(keys.len(), 6);
        for key in ["party_name", "vehicle", "date", "bill_number", "bale1", "bale2"] {
            assert!(keys.iter().any(|k| k == key), "missing {key}");
        }
        assert_eq!(doc.party_name, json!("Acme"));
        assert_eq!(doc.bill_number, json!(42));
        assert_eq!(doc.vehicle, json!("Unknown Vehicle"));
        assert_eq!(doc.date, json!("01/01/2025"));
        assert_eq!(doc.bale1["pvc_percent"], json!(20.0));
        assert_eq!(doc.bale2.len(), 1);
    }

    #[test]
    fn test_missing_slot_is_empty() {
        let doc = assemble(&json!({"bales": {"bale1": {"pvc": 1}}})).unwrap();
        assert!(doc.bale2.is_empty());
        assert_eq!(doc.bale(BaleSlot::Bale1)["pvc"], json!(1));
    }

    #[test]
    fn test_malformed_bales() {
        assert!(matches!(
            assemble(&json!({"bales": 3})),
            Err(ReportError::MalformedBales(_))
        ));
        assert!(matches!(
            assemble(&json!({"bales": {"bale1": [], "bale2": {}}})),
            Err(ReportError::MalformedBales(_))
        ));
    }
}
