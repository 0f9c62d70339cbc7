use std::time::Duration;

use agentflow_llm::ToolSpec;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::{Result, ToolError};

/// Core trait for all tools an agent can call
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's unique name
    fn name(&self) -> &str;

    /// Get the tool's description
    fn description(&self) -> &str;

    /// Get parameter schema for the tool
    fn parameter_schema(&self) -> Value;

    /// Execute the tool with given parameters
    async fn execute(&self, parameters: ToolParameters, context: ToolContext)
    -> Result<ToolResult>;

    /// Validate parameters before execution (optional override)
    async fn validate_parameters(&self, parameters: &ToolParameters) -> Result<()> {
        self.validate_against_schema(parameters)
    }

    /// Function description sent to the model
    fn spec(&self) -> ToolSpec {
        ToolSpec::function(self.name(), self.description(), self.parameter_schema())
    }

    // Helper method for schema validation
    fn validate_against_schema(&self, parameters: &ToolParameters) -> Result<()> {
        let schema = self.parameter_schema();
        let compiled = jsonschema::Validator::new(&schema)
            .map_err(|e| ToolError::validation(format!("Invalid schema: {e}")))?;

        match compiled.validate(parameters.inner()) {
            Ok(()) => Ok(()),
            Err(error) => Err(ToolError::validation(format!(
                "Parameter validation failed: {error}"
            ))),
        }
    }
}

/// Tool parameters wrapper with a schema builder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameters {
    inner: Value,
}

impl ToolParameters {
    pub fn new(value: Value) -> Self {
        Self { inner: value }
    }

    pub fn new_schema() -> Self {
        Self {
            inner: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    pub fn inner(&self) -> &Value {
        &self.inner
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let value = self
            .inner
            .get(key)
            .ok_or_else(|| ToolError::invalid_field(key, "Parameter not found"))?;
        serde_json::from_value(value.clone())
            .map_err(|_| ToolError::invalid_field(key, "Invalid parameter type"))
    }

    pub fn get_optional<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.inner.get(key) {
            Some(value) if !value.is_null() => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|_| ToolError::invalid_field(key, "Invalid parameter type")),
            _ => Ok(None),
        }
    }

    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get(key)
    }

    fn with_property(mut self, name: &str, schema: Value, required: bool) -> Self {
        let mut obj = match self.inner {
            Value::Object(o) => o,
            _ => serde_json::Map::new(),
        };

        let mut properties = obj
            .get("properties")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default();
        properties.insert(name.to_string(), schema);
        obj.insert("properties".to_string(), Value::Object(properties));

        let mut required_list = obj
            .get("required")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        if required && !required_list.contains(&json!(name)) {
            required_list.push(json!(name));
        }
        obj.insert("required".to_string(), Value::Array(required_list));
        obj.insert("type".to_string(), json!("object"));

        self.inner = Value::Object(obj);
        self
    }

    // Schema building methods
    pub fn add_required(self, name: &str, param_type: &str, description: &str) -> Self {
        self.with_property(
            name,
            json!({"type": param_type, "description": description}),
            true,
        )
    }

    pub fn add_optional(self, name: &str, param_type: &str, description: &str) -> Self {
        self.with_property(
            name,
            json!({"type": param_type, "description": description}),
            false,
        )
    }

    /// Add an optional string parameter restricted to `values`.
    pub fn add_enum(self, name: &str, values: &[&str], description: &str) -> Self {
        self.with_property(
            name,
            json!({"type": "string", "enum": values, "description": description}),
            false,
        )
    }
}

impl From<Value> for ToolParameters {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl From<ToolParameters> for Value {
    fn from(params: ToolParameters) -> Self {
        params.inner
    }
}

/// Tool execution context
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub session_id: Uuid,
    /// Artificial delay applied by simulated tools before answering.
    pub simulated_latency: Duration,
}

impl ToolContext {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            simulated_latency: Duration::ZERO,
        }
    }

    pub fn with_session_id(mut self, session_id: Uuid) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn with_simulated_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = latency;
        self
    }

    /// Sleep for the configured latency, if any.
    pub async fn simulate_latency(&self) {
        if !self.simulated_latency.is_zero() {
            tokio::time::sleep(self.simulated_latency).await;
        }
    }
}

impl Default for ToolContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Tool execution result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub content: Value,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(content: Value) -> Self {
        Self {
            success: true,
            content,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: Value::Null,
            error: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// JSON object handed back to the model.
    ///
    /// Failures become `{"error": "..."}`.
    pub fn to_payload(&self) -> Value {
        match &self.error {
            Some(message) if !self.success => json!({ "error": message }),
            _ => self.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_schema_builder() {
        let schema: Value = ToolParameters::new_schema()
            .add_required("from_location", "string", "Starting location")
            .add_enum("mode", &["driving", "walking"], "Mode of transportation")
            .into();

        assert_eq!(schema["required"], json!(["from_location"]));
        assert_eq!(schema["properties"]["mode"]["enum"], json!(["driving", "walking"]));
        assert_eq!(schema["type"], json!("object"));
    }

    #[test]
    fn test_typed_getters() {
        let params = ToolParameters::new(json!({"city": "Cape Town", "mode": null}));

        assert_eq!(params.get_string("city").unwrap(), "Cape Town");
        assert_eq!(params.get_optional::<String>("mode").unwrap(), None);
        assert!(params.get_string("date").is_err());
        assert!(params.get::<u32>("city").is_err());
    }

    #[test]
    fn test_error_payload() {
        let result = ToolResult::error("Unknown tool");
        assert!(!result.is_success());
        assert_eq!(result.to_payload(), json!({"error": "Unknown tool"}));

        let ok = ToolResult::success(json!({"duration": "25 minutes"}));
        assert_eq!(ok.to_payload(), json!({"duration": "25 minutes"}));
    }
}
