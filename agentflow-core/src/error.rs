//! Error types for agentflow flows.

use thiserror::Error;

/// Result type for flow operations.
pub type Result<T> = std::result::Result<T, FlowError>;

/// Error types that can occur during flow execution.
#[derive(Error, Debug)]
pub enum FlowError {
    /// Context manipulation error.
    #[error("Context error: {0}")]
    Context(String),

    /// Flow construction error.
    #[error("Construction error: {0}")]
    Construction(String),

    /// A node failed while running.
    #[error("Execution error: {0}")]
    Execution(String),

    /// The flow kept transitioning without reaching a terminal state.
    #[error("Flow exceeded maximum steps ({limit})")]
    MaxStepsExceeded {
        /// Configured step limit
        limit: usize,
    },

    /// Serialization/Deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error.
    #[error("Error: {0}")]
    Generic(#[from] eyre::Report),
}

impl FlowError {
    /// Create a new context error.
    pub fn context(msg: impl Into<String>) -> Self {
        Self::Context(msg.into())
    }

    /// Create a new construction error.
    pub fn construction(msg: impl Into<String>) -> Self {
        Self::Construction(msg.into())
    }

    /// Create an execution error.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }
}
