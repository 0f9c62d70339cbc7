//! # agentflow-core
//!
//! Building blocks shared by every agentflow crate: the chat message model
//! and a small state-machine flow engine.
//!
//! ## Core Concepts
//!
//! - **Message / Conversation**: OpenAI-compatible chat turns, including tool calls
//! - **Context**: conversation plus a JSON blackboard passed between nodes
//! - **State**: enumeration representing flow states
//! - **Node**: a unit of work that updates the context and picks the next state
//! - **Flow**: runs nodes until a terminal state, bounded by a step cap
//!
//! ## Quick Start
//!
//! ```rust
//! use agentflow_core::prelude::*;
//!
//! #[derive(Clone, Debug, PartialEq, Eq, Hash)]
//! enum Turn {
//!     AwaitingModel,
//!     Done,
//! }
//!
//! impl FlowState for Turn {
//!     fn is_terminal(&self) -> bool {
//!         matches!(self, Turn::Done)
//!     }
//! }
//! ```

pub mod context;
pub mod error;
pub mod flow;
pub mod message;
pub mod node;
pub mod state;

/// Convenient re-exports for common use.
pub mod prelude {
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};

    pub use crate::{
        context::{Context, ContextBuilder},
        error::{FlowError, Result},
        flow::{FlowResult, SimpleFlow, SimpleFlowBuilder},
        message::{Conversation, FunctionCall, Message, Role, ToolCall},
        node::{FnNode, Node, helpers},
        state::{FlowState, SimpleState},
    };
}
