//! Error types for chat completion calls.

use thiserror::Error;

/// Result type for chat completion operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors raised while talking to the chat completion endpoint.
#[derive(Error, Debug, Clone)]
pub enum LlmError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Model returned no choices")]
    EmptyResponse,
}

impl LlmError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an API error from an HTTP status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Api { .. } => "api",
            Self::Decode(_) => "decode",
            Self::EmptyResponse => "empty_response",
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = LlmError::api(503, "overloaded");
        assert_eq!(err.category(), "api");
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "API error (503): overloaded");

        let err = LlmError::api(401, "bad key");
        assert!(!err.is_retryable());

        let err = LlmError::configuration("missing endpoint");
        assert_eq!(err.category(), "configuration");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err = LlmError::from(json_err);
        assert_eq!(err.category(), "decode");
    }
}
