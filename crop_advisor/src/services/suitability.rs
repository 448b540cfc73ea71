//! Heuristic soil and climate suitability scores.
//!
//! Each score is the mean of closeness terms `100 - |measured - reference| * weight`,
//! rounded and clamped to `[10, 100]`. The estimator performs no validation of
//! its own; any finite or non-finite input yields a score inside the range.

use serde::{Deserialize, Serialize};

use crate::models::MeasurementSet;

pub const SCORE_FLOOR: u8 = 10;
pub const SCORE_CEILING: u8 = 100;

/// A reference value and the penalty per unit of distance from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub reference: f64,
    pub weight: f64,
}

impl ReferencePoint {
    pub const fn new(reference: f64, weight: f64) -> Self {
        Self { reference, weight }
    }

    fn closeness(&self, measured: f64) -> f64 {
        100.0 - (measured - self.reference).abs() * self.weight
    }
}

/// Reference points for every term of both scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceTable {
    pub nitrogen: ReferencePoint,
    pub phosphorus: ReferencePoint,
    pub potassium: ReferencePoint,
    pub ph: ReferencePoint,
    pub temperature: ReferencePoint,
    pub humidity: ReferencePoint,
    pub rainfall: ReferencePoint,
}

impl Default for ReferenceTable {
    fn default() -> Self {
        Self {
            nitrogen: ReferencePoint::new(70.0, 1.2),
            phosphorus: ReferencePoint::new(70.0, 1.2),
            potassium: ReferencePoint::new(100.0, 0.9),
            ph: ReferencePoint::new(6.5, 15.0),
            temperature: ReferencePoint::new(26.0, 2.2),
            humidity: ReferencePoint::new(70.0, 1.2),
            rainfall: ReferencePoint::new(120.0, 0.6),
        }
    }
}

/// Soil and climate fit of a measurement set, each in `[10, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuitabilityScore {
    pub soil: u8,
    pub climate: u8,
}

fn to_score(terms: &[f64]) -> u8 {
    let mean = terms.iter().sum::<f64>() / terms.len() as f64;
    if mean.is_nan() {
        return SCORE_FLOOR;
    }
    mean.round().clamp(f64::from(SCORE_FLOOR), f64::from(SCORE_CEILING)) as u8
}

/// Soil score from nitrogen, phosphorus, potassium and pH.
pub fn estimate_soil(values: &MeasurementSet, table: &ReferenceTable) -> u8 {
    to_score(&[
        table.nitrogen.closeness(values.nitrogen),
        table.phosphorus.closeness(values.phosphorus),
        table.potassium.closeness(values.potassium),
        table.ph.closeness(values.ph),
    ])
}

/// Climate score from temperature, humidity and rainfall.
pub fn estimate_climate(values: &MeasurementSet, table: &ReferenceTable) -> u8 {
    to_score(&[
        table.temperature.closeness(values.temperature),
        table.humidity.closeness(values.humidity),
        table.rainfall.closeness(values.rainfall),
    ])
}

/// Estimator bound to a reference table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuitabilityEstimator {
    table: ReferenceTable,
}

impl SuitabilityEstimator {
    pub fn new(table: ReferenceTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ReferenceTable {
        &self.table
    }

    pub fn estimate(&self, values: &MeasurementSet) -> SuitabilityScore {
        SuitabilityScore {
            soil: estimate_soil(values, &self.table),
            climate: estimate_climate(values, &self.table),
        }
    }
}
