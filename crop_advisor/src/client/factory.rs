//! Client factory for dependency injection.
//!
//! Creates the prediction client selected by runtime configuration.

use std::sync::Arc;
use std::time::Duration;

use super::{ClientError, ClientResult, PredictionClient, ScriptedClient};
use crate::config::ServiceSettings;

/// Prediction client type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    /// Live HTTP service (production)
    Http,
    /// In-memory scripted replies
    Scripted,
}

impl ClientType {
    /// Parse client type from string.
    ///
    /// # Arguments
    /// * `s` - String representation ("http", "scripted")
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "scripted" | "offline" => Ok(Self::Scripted),
            _ => Err(format!("Unknown client type: {}", s)),
        }
    }
}

/// Factory for creating prediction clients.
pub struct ClientFactory;

impl ClientFactory {
    /// Create a client from service settings.
    ///
    /// # Returns
    /// * `Ok(Arc<dyn PredictionClient>)` if the settings are usable
    /// * `Err(ClientError::ConfigurationError)` otherwise
    pub fn create(settings: &ServiceSettings) -> ClientResult<Arc<dyn PredictionClient>> {
        let client_type =
            ClientType::from_str(&settings.client).map_err(ClientError::ConfigurationError)?;
        match client_type {
            ClientType::Http => Self::create_http(settings),
            ClientType::Scripted => Ok(Arc::new(Self::create_scripted(settings))),
        }
    }

    #[cfg(feature = "http-client")]
    fn create_http(settings: &ServiceSettings) -> ClientResult<Arc<dyn PredictionClient>> {
        let client = super::HttpPredictionClient::new(
            &settings.base_url,
            Duration::from_secs(settings.timeout_secs),
            settings.max_retries,
        )?;
        Ok(Arc::new(client))
    }

    #[cfg(not(feature = "http-client"))]
    fn create_http(_settings: &ServiceSettings) -> ClientResult<Arc<dyn PredictionClient>> {
        Err(ClientError::ConfigurationError(
            "HTTP client support not compiled in. Enable the 'http-client' feature".to_string(),
        ))
    }

    /// Create a scripted client answering with the configured offline reply.
    pub fn create_scripted(settings: &ServiceSettings) -> ScriptedClient {
        let client = match &settings.offline_reply {
            Some(body) => ScriptedClient::always(body.clone()),
            None => ScriptedClient::new(),
        };
        if settings.offline_latency_ms > 0 {
            client.set_latency(Duration::from_millis(settings.offline_latency_ms));
        }
        client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_type_from_str() {
        assert_eq!(ClientType::from_str("HTTP").unwrap(), ClientType::Http);
        assert_eq!(ClientType::from_str("offline").unwrap(), ClientType::Scripted);
        assert!(ClientType::from_str("grpc").is_err());
    }

    #[test]
    fn test_create_rejects_unknown_type() {
        let settings = ServiceSettings {
            client: "carrier-pigeon".to_string(),
            ..ServiceSettings::default()
        };
        assert!(matches!(
            ClientFactory::create(&settings),
            Err(ClientError::ConfigurationError(_))
        ));
    }

    #[tokio::test]
    async fn test_create_scripted_with_offline_reply() {
        let settings = ServiceSettings {
            client: "scripted".to_string(),
            offline_reply: Some(r#"{"crop":"jute"}"#.to_string()),
            ..ServiceSettings::default()
        };
        let client = ClientFactory::create(&settings).unwrap();
        let set = crate::models::MeasurementSet::from_values([1.0; 7]);
        assert_eq!(client.predict(&set).await.unwrap().crop, "jute");
    }
}
