//! Error types for prediction client operations.

/// Result type for prediction client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Error type for prediction client operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response (connect failure, timeout, reset).
    #[error("Transport error: {0}")]
    TransportError(String),

    /// A response arrived but its body could not be interpreted.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// The service answered with an `error` field.
    #[error("{0}")]
    ServiceError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl ClientError {
    /// Only transport failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::TransportError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_displays_verbatim() {
        let err = ClientError::ServiceError("model unavailable".to_string());
        assert_eq!(err.to_string(), "model unavailable");
    }

    #[test]
    fn test_retryable() {
        assert!(ClientError::TransportError("timed out".into()).is_retryable());
        assert!(!ClientError::ServiceError("bad".into()).is_retryable());
        assert!(!ClientError::DecodeError("not json".into()).is_retryable());
    }
}
