//! # agentflow-llm
//!
//! Chat completion client for OpenAI-compatible endpoints, including Azure
//! deployments that require a versioned API.
//!
//! The [`ChatCompletion`] trait is the single capability every agent pattern
//! depends on. [`OpenAiClient`] implements it over HTTP; [`FnChat`] implements
//! it with a closure for tests and offline runs.

pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod stub;

pub use client::{ChatCompletion, OpenAiClient, build_client, client_from_env};
pub use config::{ClientSettings, ClientVariant};
pub use error::{LlmError, Result};
pub use request::{ChatRequest, FunctionSpec, ModelParameters, ResponseFormat, ToolSpec};
pub use response::{ChatResponse, Choice, TokenUsage};
pub use stub::{FnChat, echo_chat};

/// Convenient re-exports for common use.
pub mod prelude {
    pub use crate::{
        ChatCompletion, ChatRequest, ChatResponse, ClientSettings, LlmError, ModelParameters,
        ResponseFormat, ToolSpec,
    };
}
