//! HTTP client for the live prediction endpoint.

use async_trait::async_trait;
use log::{debug, info, warn};
use std::time::Duration;

use super::{decode_response, ClientError, ClientResult, PredictionClient};
use crate::models::{MeasurementSet, PredictionResult};

/// Path of the prediction endpoint relative to the service base URL.
pub const PREDICT_PATH: &str = "/predict";

/// Client posting form-encoded measurements to `{base_url}/predict`.
///
/// Each attempt is bounded by the configured timeout. Transport failures are
/// retried up to `max_retries` times; service-reported and decode errors are not.
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    client: reqwest::Client,
    endpoint: String,
    max_retries: u32,
}

impl HttpPredictionClient {
    /// Build a client for the given service base URL.
    ///
    /// # Arguments
    /// * `base_url` - Service root, e.g. `http://127.0.0.1:5000`
    /// * `timeout` - Per-attempt request timeout
    /// * `max_retries` - Extra attempts after a transport failure
    pub fn new(base_url: &str, timeout: Duration, max_retries: u32) -> ClientResult<Self> {
        let base = base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(ClientError::ConfigurationError(
                "Prediction service base URL is empty".to_string(),
            ));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ClientError::ConfigurationError(format!(
                "Prediction service URL must start with http:// or https://: {}",
                base
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ClientError::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", base, PREDICT_PATH),
            max_retries,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn attempt(&self, params: &[(&'static str, String)]) -> ClientResult<PredictionResult> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                ClientError::TransportError(format!("Failed to reach prediction service: {}", e))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                ClientError::TransportError(format!("Failed to read prediction response: {}", e))
            })?;

        debug!("Prediction service answered {} ({} bytes)", status, body.len());

        // Error bodies come back with 4xx/5xx statuses, so decode regardless
        decode_response(&body)
    }
}

#[async_trait]
impl PredictionClient for HttpPredictionClient {
    async fn predict(&self, measurements: &MeasurementSet) -> ClientResult<PredictionResult> {
        let params = measurements.to_form_params();
        let mut attempt = 0;
        loop {
            attempt += 1;
            info!("POST {} (attempt {})", self.endpoint, attempt);
            match self.attempt(&params).await {
                Err(e) if e.is_retryable() && attempt <= self.max_retries => {
                    warn!("Prediction attempt {} failed, retrying: {}", attempt, e);
                }
                other => return other,
            }
        }
    }
}
