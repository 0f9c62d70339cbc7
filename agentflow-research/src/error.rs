//! Error types for research operations.

use agentflow_agent::AgentError;
use thiserror::Error;

/// Errors that can occur while researching
#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{platform} returned status {status}")]
    Status { platform: String, status: u16 },

    #[error("{platform} returned no results")]
    Empty { platform: String },

    #[error("No data collected from any source")]
    NoData,

    #[error("Research question error: {0}")]
    Question(String),

    #[error("{stage} failed: {message}")]
    Stage { stage: String, message: String },

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for research operations
pub type Result<T> = std::result::Result<T, ResearchError>;

impl ResearchError {
    pub fn status(platform: impl Into<String>, status: u16) -> Self {
        Self::Status {
            platform: platform.into(),
            status,
        }
    }

    pub fn empty(platform: impl Into<String>) -> Self {
        Self::Empty {
            platform: platform.into(),
        }
    }

    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::Http(_) | Self::Status { .. } | Self::Empty { .. } => "connector",
            Self::NoData => "no_data",
            Self::Question(_) => "question",
            Self::Stage { .. } | Self::Agent(_) => "analysis",
            Self::Serialization(_) => "serialization",
            Self::Io(_) => "io",
        }
    }
}
