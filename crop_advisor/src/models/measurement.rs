//! Measurement fields, raw form input and validated measurement sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the seven soil/climate measurements collected by the form.
///
/// Declaration order is the left-to-right order of the form; validation
/// focus priority follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "N")]
    Nitrogen,
    #[serde(rename = "P")]
    Phosphorus,
    #[serde(rename = "K")]
    Potassium,
    #[serde(rename = "temperature")]
    Temperature,
    #[serde(rename = "humidity")]
    Humidity,
    #[serde(rename = "ph")]
    Ph,
    #[serde(rename = "rainfall")]
    Rainfall,
}

impl Field {
    /// All fields in form order.
    pub const ALL: [Field; 7] = [
        Field::Nitrogen,
        Field::Phosphorus,
        Field::Potassium,
        Field::Temperature,
        Field::Humidity,
        Field::Ph,
        Field::Rainfall,
    ];

    /// Key used in the form-encoded request body.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Field::Nitrogen => "N",
            Field::Phosphorus => "P",
            Field::Potassium => "K",
            Field::Temperature => "temperature",
            Field::Humidity => "humidity",
            Field::Ph => "ph",
            Field::Rainfall => "rainfall",
        }
    }

    /// Human-readable label used in validation messages.
    pub fn label(&self) -> &'static str {
        match self {
            Field::Nitrogen => "Nitrogen",
            Field::Phosphorus => "Phosphorus",
            Field::Potassium => "Potassium",
            Field::Temperature => "Temperature",
            Field::Humidity => "Humidity",
            Field::Ph => "pH",
            Field::Rainfall => "Rainfall",
        }
    }

    /// Position of the field in form order.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Parse a field from its wire name. Matching is case-sensitive for the
    /// single-letter nutrient keys, as the form is.
    pub fn from_wire_name(s: &str) -> Result<Self, String> {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.wire_name() == s)
            .ok_or_else(|| format!("Unknown measurement field: {}", s))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Raw text of every form field, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    values: [String; 7],
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a form from `(field, raw)` pairs. Missing fields stay empty.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Field, S)>,
        S: Into<String>,
    {
        let mut form = Self::new();
        for (field, raw) in pairs {
            form.set(field, raw);
        }
        form
    }

    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: Field, raw: impl Into<String>) {
        self.values[field.index()] = raw.into();
    }

    pub fn clear(&mut self) {
        self.values = Default::default();
    }

    /// Iterate `(field, raw)` in form order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL.iter().map(move |f| (*f, self.get(*f)))
    }
}

/// Seven validated, finite measurements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSet {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl MeasurementSet {
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Nitrogen => self.nitrogen,
            Field::Phosphorus => self.phosphorus,
            Field::Potassium => self.potassium,
            Field::Temperature => self.temperature,
            Field::Humidity => self.humidity,
            Field::Ph => self.ph,
            Field::Rainfall => self.rainfall,
        }
    }

    pub(crate) fn from_values(values: [f64; 7]) -> Self {
        let [nitrogen, phosphorus, potassium, temperature, humidity, ph, rainfall] = values;
        Self {
            nitrogen,
            phosphorus,
            potassium,
            temperature,
            humidity,
            ph,
            rainfall,
        }
    }

    /// Form-encoded request parameters, one decimal string per field.
    pub fn to_form_params(&self) -> Vec<(&'static str, String)> {
        Field::ALL
            .iter()
            .map(|f| (f.wire_name(), self.get(*f).to_string()))
            .collect()
    }
}

/// Optional inclusive numeric bounds for one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldBounds {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl FieldBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub const fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }
}

/// Per-field bounds used by the bounded validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundsTable {
    bounds: [FieldBounds; 7],
}

impl BoundsTable {
    pub fn get(&self, field: Field) -> FieldBounds {
        self.bounds[field.index()]
    }

    pub fn set(&mut self, field: Field, bounds: FieldBounds) {
        self.bounds[field.index()] = bounds;
    }

    /// Apply overrides keyed by wire name on top of these bounds.
    pub fn with_overrides(
        mut self,
        overrides: &BTreeMap<String, FieldBounds>,
    ) -> Result<Self, String> {
        for (key, bounds) in overrides {
            let field = Field::from_wire_name(key)?;
            // A side left out of the override keeps its current value
            let current = self.get(field);
            let merged = FieldBounds {
                min: bounds.min.or(current.min),
                max: bounds.max.or(current.max),
            };
            if let (Some(min), Some(max)) = (merged.min, merged.max) {
                if min > max {
                    return Err(format!("Bounds for {} have min {} above max {}", key, min, max));
                }
            }
            self.set(field, merged);
        }
        Ok(self)
    }
}

impl Default for BoundsTable {
    fn default() -> Self {
        Self {
            bounds: [
                FieldBounds::new(0.0, 140.0),
                FieldBounds::new(0.0, 145.0),
                FieldBounds::new(0.0, 205.0),
                FieldBounds::new(0.0, 50.0),
                FieldBounds::new(0.0, 100.0),
                FieldBounds::new(0.0, 14.0),
                FieldBounds::new(0.0, 500.0),
            ],
        }
    }
}
