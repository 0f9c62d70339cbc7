//! Error types for cognitive operations.

use agentflow_core::error::FlowError;
use agentflow_llm::LlmError;
use thiserror::Error;

/// Errors that can occur during cognitive operations
#[derive(Error, Debug)]
pub enum CognitiveError {
    #[error("Planning failed: {message}")]
    PlanningFailed { message: String },

    #[error("Retrieval failed: {message}")]
    RetrievalFailed { message: String },

    #[error("Invalid cognitive configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Model error: {0}")]
    Model(#[from] LlmError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Knowledge base format error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Core flow error: {0}")]
    CoreError(#[from] FlowError),
}

/// Result type for cognitive operations
pub type Result<T> = std::result::Result<T, CognitiveError>;

impl CognitiveError {
    pub fn planning(message: impl Into<String>) -> Self {
        Self::PlanningFailed {
            message: message.into(),
        }
    }

    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::RetrievalFailed {
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

impl From<CognitiveError> for FlowError {
    fn from(err: CognitiveError) -> Self {
        match err {
            CognitiveError::CoreError(inner) => inner,
            other => FlowError::context(other.to_string()),
        }
    }
}
