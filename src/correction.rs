// src/correction.rs

use crate::report::{Bale, BaleSlot, Measurement, Report, percent_of};
use serde::{Deserialize, Deserializer, de};
use serde_json::{Map, Value};

/// The hand-corrected report as posted by the edit form. Measurements left
/// out of the submission, or submitted blank, bind as `0.0`.
#[derive(Debug, Clone, Deserialize)]
pub struct CorrectionForm {
    pub party_name: String,
    pub vehicle: String,
    pub date: String,
    pub bill_number: i64,

    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale1_bale_weight: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale1_tar_raffiya: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale1_pvc: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale1_non_pet: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale1_non_food: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale1_metal: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale1_colour: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale1_big_jar: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale1_big_jar_mix: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale1_d_grade: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale1_dirty_bottle: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale1_moisture: f64,

    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale2_bale_weight: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale2_tar_raffiya: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale2_pvc: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale2_non_pet: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale2_non_food: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale2_metal: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale2_colour: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale2_big_jar: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale2_big_jar_mix: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale2_d_grade: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale2_dirty_bottle: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub bale2_moisture: f64,
}

impl CorrectionForm {
    /// One bale's readings in [`Measurement::ALL`] order.
    pub fn readings(&self, slot: BaleSlot) -> [f64; 12] {
        match slot {
            BaleSlot::Bale1 => [
                self.bale1_bale_weight,
                self.bale1_tar_raffiya,
                self.bale1_pvc,
                self.bale1_non_pet,
                self.bale1_non_food,
                self.bale1_metal,
                self.bale1_colour,
                self.bale1_big_jar,
                self.bale1_big_jar_mix,
                self.bale1_d_grade,
                self.bale1_dirty_bottle,
                self.bale1_moisture,
            ],
            BaleSlot::Bale2 => [
                self.bale2_bale_weight,
                self.bale2_tar_raffiya,
                self.bale2_pvc,
                self.bale2_non_pet,
                self.bale2_non_food,
                self.bale2_metal,
                self.bale2_colour,
                self.bale2_big_jar,
                self.bale2_big_jar_mix,
                self.bale2_d_grade,
                self.bale2_dirty_bottle,
                self.bale2_moisture,
            ],
        }
    }
}

/// Form values arrive as text; a cleared input sends an empty string.
fn blank_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Reading {
        Number(f64),
        Text(String),
    }

    match Reading::deserialize(deserializer)? {
        Reading::Number(n) => Ok(n),
        Reading::Text(s) if s.trim().is_empty() => Ok(0.0),
        Reading::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid measurement: {s:?}"))),
    }
}

/// Build a report straight from the form. Both bales always get all eleven
/// percentage fields, `0.0` when the bale weight is zero.
pub fn build_report(form: &CorrectionForm) -> Report {
    let mut bales = Map::new();
    for slot in BaleSlot::ALL {
        bales.insert(slot.key().to_string(), Value::Object(build_bale(form.readings(slot))));
    }

    let mut map = Map::new();
    map.insert("party_name".to_string(), Value::from(form.party_name.as_str()));
    map.insert("vehicle".to_string(), Value::from(form.vehicle.as_str()));
    map.insert("date".to_string(), Value::from(form.date.as_str()));
    map.insert("bill_number".to_string(), Value::from(form.bill_number));
    map.insert("bales".to_string(), Value::Object(bales));
    Report::from(map)
}

fn build_bale(readings: [f64; 12]) -> Bale {
    let weight = readings[0];
    let mut bale = Bale::new();
    for (m, value) in Measurement::ALL.into_iter().zip(readings) {
        bale.insert(m.key().to_string(), Value::from(value));
        if m.is_contaminant() {
            bale.insert(m.percent_key(), Value::from(percent_of(value, weight)));
        }
    }
    bale
}
