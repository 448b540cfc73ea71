pub mod measurement;
pub mod prediction;

pub use measurement::{BoundsTable, Field, FieldBounds, FormInput, MeasurementSet};
pub use prediction::{CropInfo, PredictionResponse, PredictionResult, ResponseOutcome};
