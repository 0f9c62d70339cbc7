//! OpenAI-compatible chat completions request body.
//!
//! Optional fields use `skip_serializing_if` so they are simply absent on the
//! wire when unused.

use agentflow_core::message::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sampling parameters applied to a single request.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelParameters {
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
}

impl ModelParameters {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Requested output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    /// The model must answer with a single JSON object.
    JsonObject,
}

/// A function the model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionSpec,
}

/// Name, description and JSON schema of a callable function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolSpec {
    /// Describe a function tool.
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionSpec {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// Chat completions request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model or deployment name. Filled in by the client when left empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Conversation sent to the model.
    pub messages: Vec<Message>,
    /// Tools the model may call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolSpec>>,
    /// Tool choice control, e.g. `"auto"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<Value>,
    /// Output format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
}

impl ChatRequest {
    /// Create a request for the given messages.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            model: None,
            messages,
            tools: None,
            tool_choice: None,
            response_format: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_parameters(mut self, parameters: ModelParameters) -> Self {
        self.temperature = parameters.temperature;
        self.max_tokens = parameters.max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Offer tools and let the model decide whether to call them.
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        if !tools.is_empty() {
            self.tools = Some(tools);
            self.tool_choice = Some(Value::String("auto".to_string()));
        }
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    /// Text content of the last message, if any.
    pub fn last_text(&self) -> &str {
        self.messages.last().map(Message::text).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_minimal_request_omits_optional_fields() {
        let request = ChatRequest::new(vec![Message::user("hi")]);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value, json!({"messages": [{"role": "user", "content": "hi"}]}));
    }

    #[test]
    fn test_tools_and_json_format() {
        let spec = ToolSpec::function(
            "get_venue_info",
            "Get venue details",
            json!({"type": "object", "properties": {}}),
        );
        let request = ChatRequest::new(vec![Message::user("where?")])
            .with_model("gpt-4")
            .with_tools(vec![spec])
            .with_response_format(ResponseFormat::JsonObject)
            .with_parameters(ModelParameters::default().with_max_tokens(1500));

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["tool_choice"], json!("auto"));
        assert_eq!(value["tools"][0]["type"], json!("function"));
        assert_eq!(value["tools"][0]["function"]["name"], json!("get_venue_info"));
        assert_eq!(value["response_format"], json!({"type": "json_object"}));
        assert_eq!(value["max_tokens"], json!(1500));
        assert!(value.get("temperature").is_none());
    }

    #[test]
    fn test_empty_tool_list_is_not_sent() {
        let request = ChatRequest::new(vec![]).with_tools(vec![]);
        assert!(request.tools.is_none());
        assert!(request.tool_choice.is_none());
    }
}
