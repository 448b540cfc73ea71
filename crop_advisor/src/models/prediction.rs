//! Wire types for the prediction service response.

use serde::{Deserialize, Serialize};

/// Extra growing information attached to a prediction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil: Option<String>,
}

impl CropInfo {
    pub fn is_empty(&self) -> bool {
        self.season.is_none() && self.water.is_none() && self.soil.is_none()
    }
}

/// A successful prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub crop: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<CropInfo>,
}

/// Raw response body as the service sends it.
///
/// `error` and `crop` are mutually exclusive in practice; `error` wins when
/// both are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub crop: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub info: Option<CropInfo>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Interpretation of a decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
    Prediction(PredictionResult),
    ServiceError(String),
    Malformed(String),
}

impl PredictionResponse {
    pub fn into_outcome(self) -> ResponseOutcome {
        if let Some(error) = self.error {
            return ResponseOutcome::ServiceError(error);
        }
        match self.crop {
            Some(crop) => ResponseOutcome::Prediction(PredictionResult {
                crop,
                confidence: self.confidence,
                info: self.info,
            }),
            None => {
                ResponseOutcome::Malformed("response has neither 'crop' nor 'error'".to_string())
            }
        }
    }
}
