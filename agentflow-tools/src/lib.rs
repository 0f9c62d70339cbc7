//! agentflow-tools - tools an agent can call through function calling
//!
//! This crate provides:
//!
//! - A tool abstraction with JSON schema parameter validation
//! - A registry that executes tools by name and describes them to the model
//! - The simulated conference assistant tools
//!
//! ## Example Usage
//!
//! ```rust
//! use agentflow_tools::prelude::*;
//!
//! struct EchoTool;
//!
//! #[async_trait]
//! impl Tool for EchoTool {
//!     fn name(&self) -> &str { "echo" }
//!     fn description(&self) -> &str { "Echo input back" }
//!
//!     fn parameter_schema(&self) -> serde_json::Value {
//!         ToolParameters::new_schema()
//!             .add_required("message", "string", "Message to echo")
//!             .into()
//!     }
//!
//!     async fn execute(&self, params: ToolParameters, _ctx: ToolContext) -> Result<ToolResult> {
//!         let message: String = params.get("message")?;
//!         Ok(ToolResult::success(json!({ "message": message })))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let registry = ToolRegistry::new();
//!     registry.register_tool(std::sync::Arc::new(EchoTool)).await?;
//!
//!     let params = json!({"message": "Hello, World!"});
//!     let result = registry.execute_tool("echo", &params, &ToolContext::new()).await?;
//!     println!("Result: {}", result.content);
//!     Ok(())
//! }
//! ```

/// Simulated conference assistant tools.
pub mod conference;
/// Core tool abstractions and trait definitions.
pub mod core;
/// Error types for tool operations.
pub mod error;
/// Tool registry for discovery and execution.
pub mod registry;

pub use crate::core::{Tool, ToolContext, ToolParameters, ToolResult};

pub use conference::{TravelTimeTool, VenueInfoTool, WeatherTool, conference_registry};
pub use error::{Result, ToolError};
pub use registry::ToolRegistry;

/// Prelude module for convenient imports
pub mod prelude {
    pub use async_trait::async_trait;
    pub use serde_json::{Value, json};

    pub use crate::{
        core::{Tool, ToolContext, ToolParameters, ToolResult},
        error::{Result, ToolError},
        registry::ToolRegistry,
    };
}
