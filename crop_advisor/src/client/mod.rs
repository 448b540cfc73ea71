//! Clients for the external crop prediction service.
//!
//! The [`PredictionClient`] trait is the seam between the submission
//! orchestrator and the service:
//! - `http`: reqwest-based client for the live `POST /predict` endpoint
//! - `scripted`: in-memory client replaying canned responses, for tests and
//!   offline use

pub mod error;
pub mod factory;
#[cfg(feature = "http-client")]
pub mod http;
pub mod scripted;

use async_trait::async_trait;

pub use error::{ClientError, ClientResult};
pub use factory::{ClientFactory, ClientType};
#[cfg(feature = "http-client")]
pub use http::HttpPredictionClient;
pub use scripted::ScriptedClient;

use crate::models::{MeasurementSet, PredictionResponse, PredictionResult, ResponseOutcome};

/// A service that maps a measurement set to a recommended crop.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait PredictionClient: Send + Sync {
    /// Request a prediction for validated measurements.
    ///
    /// # Returns
    /// * `Ok(PredictionResult)` - The service answered with a crop
    /// * `Err(ClientError::ServiceError)` - The service answered with an `error` field
    /// * `Err(ClientError)` - Transport or decoding failure
    async fn predict(&self, measurements: &MeasurementSet) -> ClientResult<PredictionResult>;
}

#[async_trait]
impl<C: PredictionClient + ?Sized> PredictionClient for Box<C> {
    async fn predict(&self, measurements: &MeasurementSet) -> ClientResult<PredictionResult> {
        (**self).predict(measurements).await
    }
}

#[async_trait]
impl<C: PredictionClient + ?Sized> PredictionClient for std::sync::Arc<C> {
    async fn predict(&self, measurements: &MeasurementSet) -> ClientResult<PredictionResult> {
        (**self).predict(measurements).await
    }
}

/// Decode a response body into a prediction or a client error.
///
/// The `error` field is checked before `crop`.
pub fn decode_response(body: &str) -> ClientResult<PredictionResult> {
    let response: PredictionResponse = serde_json::from_str(body).map_err(|e| {
        ClientError::DecodeError(format!(
            "Failed to parse prediction response: {} ({})",
            e,
            body.trim()
        ))
    })?;

    match response.into_outcome() {
        ResponseOutcome::Prediction(result) => Ok(result),
        ResponseOutcome::ServiceError(message) => Err(ClientError::ServiceError(message)),
        ResponseOutcome::Malformed(reason) => Err(ClientError::DecodeError(reason)),
    }
}
