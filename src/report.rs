// src/report.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One bale's measurements, keyed by [`Measurement::key`] and
/// [`Measurement::percent_key`].
pub type Bale = Map<String, Value>;

/// A weight recorded for every bale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measurement {
    BaleWeight,
    TarRaffiya,
    Pvc,
    NonPet,
    NonFood,
    Metal,
    Colour,
    BigJar,
    BigJarMix,
    DGrade,
    DirtyBottle,
    Moisture,
}

impl Measurement {
    /// Schema order. `BaleWeight` comes first; the rest are contaminants.
    pub const ALL: [Measurement; 12] = [
        Measurement::BaleWeight,
        Measurement::TarRaffiya,
        Measurement::Pvc,
        Measurement::NonPet,
        Measurement::NonFood,
        Measurement::Metal,
        Measurement::Colour,
        Measurement::BigJar,
        Measurement::BigJarMix,
        Measurement::DGrade,
        Measurement::DirtyBottle,
        Measurement::Moisture,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Measurement::BaleWeight => "bale_weight",
            Measurement::TarRaffiya => "tar_raffiya",
            Measurement::Pvc => "pvc",
            Measurement::NonPet => "non_pet",
            Measurement::NonFood => "non_food",
            Measurement::Metal => "metal",
            Measurement::Colour => "colour",
            Measurement::BigJar => "big_jar",
            Measurement::BigJarMix => "big_jar_mix",
            Measurement::DGrade => "d_grade",
            Measurement::DirtyBottle => "dirty_bottle",
            Measurement::Moisture => "moisture",
        }
    }

    /// Human-readable row label for pages and documents.
    pub fn label(self) -> &'static str {
        match self {
            Measurement::BaleWeight => "Bale Weight",
            Measurement::TarRaffiya => "Tar / Raffiya",
            Measurement::Pvc => "PVC",
            Measurement::NonPet => "Non-PET",
            Measurement::NonFood => "Non-Food",
            Measurement::Metal => "Metal",
            Measurement::Colour => "Colour",
            Measurement::BigJar => "Big Jar",
            Measurement::BigJarMix => "Big Jar Mix",
            Measurement::DGrade => "D Grade",
            Measurement::DirtyBottle => "Dirty Bottle",
            Measurement::Moisture => "Moisture",
        }
    }

    pub fn percent_key(self) -> String {
        format!("{}_percent", self.key())
    }

    pub fn is_contaminant(self) -> bool {
        self != Measurement::BaleWeight
    }

    /// Every measurement that gets a `_percent` sibling.
    pub fn contaminants() -> impl Iterator<Item = Measurement> {
        Self::ALL.into_iter().filter(|m| m.is_contaminant())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaleSlot {
    Bale1,
    Bale2,
}

impl BaleSlot {
    pub const ALL: [BaleSlot; 2] = [BaleSlot::Bale1, BaleSlot::Bale2];

    pub fn key(self) -> &'static str {
        match self {
            BaleSlot::Bale1 => "bale1",
            BaleSlot::Bale2 => "bale2",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BaleSlot::Bale1 => "Bale 1",
            BaleSlot::Bale2 => "Bale 2",
        }
    }
}

/// Top-level scalar fields of a report, each with its fallback value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    PartyName,
    Vehicle,
    Date,
    BillNumber,
}

impl HeaderField {
    pub const ALL: [HeaderField; 4] = [
        HeaderField::PartyName,
        HeaderField::Vehicle,
        HeaderField::Date,
        HeaderField::BillNumber,
    ];

    pub fn key(self) -> &'static str {
        match self {
            HeaderField::PartyName => "party_name",
            HeaderField::Vehicle => "vehicle",
            HeaderField::Date => "date",
            HeaderField::BillNumber => "bill_number",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HeaderField::PartyName => "Party Name",
            HeaderField::Vehicle => "Vehicle",
            HeaderField::Date => "Date",
            HeaderField::BillNumber => "Bill Number",
        }
    }

    pub fn default_value(self) -> Value {
        match self {
            HeaderField::PartyName => Value::from("Unknown Party"),
            HeaderField::Vehicle => Value::from("Unknown Vehicle"),
            HeaderField::Date => Value::from("01/01/2025"),
            HeaderField::BillNumber => Value::from(0),
        }
    }

    /// The field from `source` if present (whatever its type), else the default.
    pub fn salvage(self, source: Option<&Map<String, Value>>) -> Value {
        source
            .and_then(|map| map.get(self.key()))
            .cloned()
            .unwrap_or_else(|| self.default_value())
    }
}

/// One recycling transaction. Kept as a JSON object because extracted
/// values are passed through without type coercion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report(Map<String, Value>);

impl Report {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn bale(&self, slot: BaleSlot) -> Option<&Bale> {
        self.0
            .get("bales")
            .and_then(Value::as_object)
            .and_then(|bales| bales.get(slot.key()))
            .and_then(Value::as_object)
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }
}

impl From<Map<String, Value>> for Report {
    fn from(map: Map<String, Value>) -> Self {
        Report(map)
    }
}

/// A bale with all twelve measurements at `0.0` and no percentages.
pub fn zero_bale() -> Bale {
    Measurement::ALL
        .into_iter()
        .map(|m| (m.key().to_string(), Value::from(0.0)))
        .collect()
}

/// `value` as a percentage of `weight`; `0.0` for an empty bale.
pub fn percent_of(value: f64, weight: f64) -> f64 {
    if weight > 0.0 {
        (value / weight) * 100.0
    } else {
        0.0
    }
}

/// Render a JSON scalar for display: strings without quotes, everything
/// else in its JSON form.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
