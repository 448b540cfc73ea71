//! In-memory prediction client.
//!
//! Replays canned response bodies or transport failures in order and records
//! every request it receives, providing fast, deterministic, and isolated
//! execution for tests and offline runs.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use super::{decode_response, ClientError, ClientResult, PredictionClient};
use crate::models::{MeasurementSet, PredictionResult};

/// One scripted reaction of the fake service.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedReply {
    /// A raw response body, decoded like a real one.
    Body(String),
    /// A transport failure with the given description.
    TransportFailure(String),
}

/// In-memory client replaying scripted replies.
///
/// # Example
/// ```
/// use crop_advisor::client::{PredictionClient, ScriptedClient};
/// # use crop_advisor::models::{Field, FormInput};
/// # use crop_advisor::preprocessing::FormValidator;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let client = ScriptedClient::new();
/// client.push_body(r#"{"crop":"rice"}"#);
///
/// # let form = FormInput::from_pairs(crop_advisor::models::Field::ALL.map(|f| (f, "1")));
/// # let set = FormValidator::bounded().validate_all(&form).measurements().unwrap();
/// let result = client.predict(&set).await.unwrap();
/// assert_eq!(result.crop, "rice");
/// assert_eq!(client.requests().len(), 1);
/// # }
/// ```
#[derive(Clone, Default)]
pub struct ScriptedClient {
    data: Arc<RwLock<ScriptedData>>,
}

#[derive(Default)]
struct ScriptedData {
    replies: VecDeque<ScriptedReply>,
    fallback: Option<ScriptedReply>,
    requests: Vec<MeasurementSet>,
    latency: Option<Duration>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client that answers every request with the same body.
    pub fn always(body: impl Into<String>) -> Self {
        let client = Self::new();
        client.write().fallback = Some(ScriptedReply::Body(body.into()));
        client
    }

    pub fn push_body(&self, body: impl Into<String>) {
        self.write().replies.push_back(ScriptedReply::Body(body.into()));
    }

    pub fn push_transport_failure(&self, reason: impl Into<String>) {
        self.write()
            .replies
            .push_back(ScriptedReply::TransportFailure(reason.into()));
    }

    /// Delay every reply, simulating a slow service.
    pub fn set_latency(&self, latency: Duration) {
        self.write().latency = Some(latency);
    }

    /// Measurements received so far, oldest first.
    pub fn requests(&self) -> Vec<MeasurementSet> {
        self.read().requests.clone()
    }

    // A panicking test thread must not hide the script from later readers
    fn read(&self) -> RwLockReadGuard<'_, ScriptedData> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, ScriptedData> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl PredictionClient for ScriptedClient {
    async fn predict(&self, measurements: &MeasurementSet) -> ClientResult<PredictionResult> {
        let (reply, latency) = {
            let mut data = self.write();
            data.requests.push(*measurements);
            let reply = data.replies.pop_front().or_else(|| data.fallback.clone());
            (reply, data.latency)
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        match reply {
            Some(ScriptedReply::Body(body)) => decode_response(&body),
            Some(ScriptedReply::TransportFailure(reason)) => {
                Err(ClientError::TransportError(reason))
            }
            None => Err(ClientError::TransportError(
                "scripted client has no reply queued".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MeasurementSet {
        MeasurementSet::from_values([90.0, 42.0, 43.0, 20.8, 82.0, 6.5, 202.9])
    }

    #[tokio::test]
    async fn test_replies_in_order_then_fallback() {
        let client = ScriptedClient::always(r#"{"crop":"maize"}"#);
        client.push_body(r#"{"crop":"rice"}"#);
        client.push_transport_failure("connection refused");

        assert_eq!(client.predict(&sample()).await.unwrap().crop, "rice");
        assert_eq!(
            client.predict(&sample()).await.unwrap_err(),
            ClientError::TransportError("connection refused".to_string())
        );
        assert_eq!(client.predict(&sample()).await.unwrap().crop, "maize");
        assert_eq!(client.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_script_is_transport_error() {
        let client = ScriptedClient::new();
        assert!(client.predict(&sample()).await.unwrap_err().is_retryable());
        assert_eq!(client.requests(), vec![sample()]);
    }

    #[tokio::test]
    async fn test_poisoned_lock_keeps_recorded_requests() {
        let client = ScriptedClient::always(r#"{"crop":"maize"}"#);
        client.predict(&sample()).await.unwrap();

        let holder = client.clone();
        let joined = std::thread::spawn(move || {
            let _guard = holder.data.write().unwrap();
            panic!("writer panicked while holding the lock");
        })
        .join();
        assert!(joined.is_err());
        assert!(client.data.is_poisoned());

        assert_eq!(client.requests(), vec![sample()]);
        assert_eq!(client.predict(&sample()).await.unwrap().crop, "maize");
        assert_eq!(client.requests().len(), 2);
    }
}
