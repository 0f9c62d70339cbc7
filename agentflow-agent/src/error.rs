//! Error types for agent operations.

use agentflow_core::prelude::FlowError;
use agentflow_llm::LlmError;
use agentflow_tools::ToolError;
use thiserror::Error;

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Main error type for agent operations.
#[derive(Error, Debug, Clone)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Model error: {0}")]
    Model(#[from] LlmError),

    #[error("Tool execution error: {tool}: {message}")]
    ToolExecution { tool: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Coordination error: {0}")]
    Coordination(String),

    #[error("Context error: {0}")]
    Context(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AgentError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a tool execution error
    pub fn tool_execution(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a coordination error
    pub fn coordination(message: impl Into<String>) -> Self {
        Self::Coordination(message.into())
    }

    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Model(err) if err.is_retryable())
    }

    /// Check if the error is a user error
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::NotFound(_))
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Model(_) => "model",
            Self::ToolExecution { .. } => "tool_execution",
            Self::NotFound(_) => "not_found",
            Self::Coordination(_) => "coordination",
            Self::Context(_) => "context",
            Self::Serialization(_) => "serialization",
        }
    }
}

/// Render a failure the way it is shown in place of an agent's output.
pub fn inline_error(err: &impl std::fmt::Display) -> String {
    format!("Error: {err}")
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AgentError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<AgentError> for FlowError {
    fn from(err: AgentError) -> Self {
        match &err {
            AgentError::Configuration(_) => FlowError::construction(err.to_string()),
            _ => FlowError::execution(err.to_string()),
        }
    }
}

impl From<FlowError> for AgentError {
    fn from(err: FlowError) -> Self {
        Self::Context(err.to_string())
    }
}

impl From<ToolError> for AgentError {
    fn from(err: ToolError) -> Self {
        Self::ToolExecution {
            tool: "unknown".to_string(),
            message: err.to_string(),
        }
    }
}
