use std::{collections::HashMap, sync::Arc};

use agentflow_llm::ToolSpec;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::{
    core::{Tool, ToolContext, ToolParameters, ToolResult},
    error::{Result, ToolError},
};

#[derive(Default)]
struct Registered {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

/// Tool registry for managing and executing tools
///
/// Tools are listed and offered to the model in registration order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    inner: Arc<RwLock<Registered>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub async fn register_tool(&self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if name.is_empty() {
            return Err(ToolError::invalid_parameters("tool name must not be empty"));
        }

        let mut registered = self.inner.write().await;
        if registered.tools.insert(name.clone(), tool).is_none() {
            registered.order.push(name);
        }
        Ok(())
    }

    /// Execute a tool by name after validating its arguments
    pub async fn execute_tool(
        &self,
        tool_name: &str,
        parameters: &Value,
        context: &ToolContext,
    ) -> Result<ToolResult> {
        let tool = {
            let registered = self.inner.read().await;
            registered
                .tools
                .get(tool_name)
                .cloned()
                .ok_or_else(|| ToolError::not_found(tool_name))?
        };

        let tool_params = ToolParameters::new(parameters.clone());
        if let Err(e) = tool.validate_parameters(&tool_params).await {
            warn!(tool = tool_name, error = %e, "rejected tool arguments");
            return Err(ToolError::invalid_parameters(e.to_string()));
        }

        debug!(tool = tool_name, %parameters, "executing tool");
        tool.execute(tool_params, context.clone()).await
    }

    /// List all tool names in registration order
    pub async fn list_tools(&self) -> Vec<String> {
        self.inner.read().await.order.clone()
    }

    /// Whether a tool with this name is registered
    pub async fn contains(&self, name: &str) -> bool {
        self.inner.read().await.tools.contains_key(name)
    }

    /// Function descriptions for every registered tool
    pub async fn specs(&self) -> Vec<ToolSpec> {
        let registered = self.inner.read().await;
        registered
            .order
            .iter()
            .filter_map(|name| registered.tools.get(name))
            .map(|tool| tool.spec())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo input back"
        }

        fn parameter_schema(&self) -> Value {
            ToolParameters::new_schema()
                .add_required("message", "string", "Message to echo")
                .into()
        }

        async fn execute(&self, params: ToolParameters, _ctx: ToolContext) -> Result<ToolResult> {
            let message: String = params.get("message")?;
            Ok(ToolResult::success(json!({ "echo": message })))
        }
    }

    #[tokio::test]
    async fn test_register_and_execute() {
        let registry = ToolRegistry::new();
        registry.register_tool(Arc::new(EchoTool)).await.unwrap();

        assert_eq!(registry.list_tools().await, vec!["echo".to_string()]);

        let result = registry
            .execute_tool("echo", &json!({"message": "hi"}), &ToolContext::new())
            .await
            .unwrap();
        assert_eq!(result.content, json!({"echo": "hi"}));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry
            .execute_tool("missing", &json!({}), &ToolContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_rejected() {
        let registry = ToolRegistry::new();
        registry.register_tool(Arc::new(EchoTool)).await.unwrap();

        let err = registry
            .execute_tool("echo", &json!({"message": 42}), &ToolContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn test_reregistering_keeps_single_entry() {
        let registry = ToolRegistry::new();
        registry.register_tool(Arc::new(EchoTool)).await.unwrap();
        registry.register_tool(Arc::new(EchoTool)).await.unwrap();

        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.specs().await[0].function.name, "echo");
    }
}
