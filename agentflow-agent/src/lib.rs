//! Agents for agentflow.
//!
//! Named agent profiles, chat sessions, multi-agent workflows and a
//! tool-calling agent, all driven through an injected
//! [`ChatCompletion`](agentflow_llm::ChatCompletion).
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use agentflow_agent::prelude::*;
//! use agentflow_llm::echo_chat;
//!
//! # tokio_test::block_on(async {
//! let orchestrator = Orchestrator::new(Arc::new(echo_chat()), rosters::advanced());
//! let result = orchestrator
//!     .run(&WorkflowMode::sequential(["Analyst", "Strategist"]), "q")
//!     .await
//!     .unwrap();
//! assert_eq!(result.get("Analyst"), Some("echo:q"));
//! # });
//! ```

pub mod chat;
pub mod error;
pub mod profile;
pub mod tool_agent;
pub mod workflow;

pub use chat::{AgentOutput, ChatSession, Comparison, NOT_CONFIGURED_REPLY, ask, compare};
pub use error::{AgentError, Result, inline_error};
pub use profile::{AgentProfile, Roster, rosters};
pub use tool_agent::{ToolAgent, ToolCallRecord, ToolLoopState, ToolRunOutcome};
pub use workflow::{ContextStyle, Orchestrator, WorkflowEvent, WorkflowMode, WorkflowResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        chat::{AgentOutput, ChatSession, compare},
        error::{AgentError, Result},
        profile::{AgentProfile, Roster, rosters},
        tool_agent::{ToolAgent, ToolRunOutcome},
        workflow::{ContextStyle, Orchestrator, WorkflowEvent, WorkflowMode, WorkflowResult},
    };
}
