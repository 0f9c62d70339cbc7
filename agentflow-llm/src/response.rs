//! OpenAI-compatible chat completions response body.

use agentflow_core::message::{Message, ToolCall};
use serde::{Deserialize, Serialize};

/// Token accounting reported by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

/// One candidate completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: usize,
    pub message: Message,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Chat completions response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

impl ChatResponse {
    /// Wrap a single assistant message.
    pub fn from_message(message: Message) -> Self {
        let finish_reason = if message.has_tool_calls() {
            "tool_calls"
        } else {
            "stop"
        };
        Self {
            id: format!("chatcmpl-{}", uuid::Uuid::new_v4().simple()),
            model: None,
            choices: vec![Choice {
                index: 0,
                message,
                finish_reason: Some(finish_reason.to_string()),
            }],
            usage: None,
        }
    }

    /// A plain text answer.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_message(Message::assistant(text))
    }

    /// An answer that only requests tool calls.
    pub fn from_tool_calls(calls: Vec<ToolCall>) -> Self {
        Self::from_message(Message::assistant_with_tools(None, calls))
    }

    /// The first choice's message.
    pub fn message(&self) -> Option<&Message> {
        self.choices.first().map(|choice| &choice.message)
    }

    /// Consume the response, returning the first choice's message.
    pub fn into_message(self) -> Option<Message> {
        self.choices.into_iter().next().map(|choice| choice.message)
    }

    /// Text of the first choice, empty when the model sent none.
    pub fn text(&self) -> Option<&str> {
        self.message().map(Message::text)
    }

    /// Tool calls requested by the first choice.
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.message()
            .map(|message| message.tool_calls.as_slice())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use agentflow_core::message::Role;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_tool_call_response() {
        let body = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "model": "gpt-4",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {"name": "get_weather", "arguments": "{\"city\":\"Cape Town\",\"date\":\"2025-11-15\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;

        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.tool_calls().len(), 1);
        assert_eq!(response.tool_calls()[0].function.name, "get_weather");
        assert_eq!(response.text(), Some(""));
        assert_eq!(response.usage.map(|u| u.total_tokens), Some(15));
    }

    #[test]
    fn test_parse_plain_reply_with_null_tool_calls() {
        let body = r#"{"id":"x","choices":[{"index":0,"finish_reason":"stop","message":{"role":"assistant","content":"hi","tool_calls":null}}]}"#;

        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), Some("hi"));
        assert!(response.tool_calls().is_empty());
    }

    #[test]
    fn test_from_text() {
        let response = ChatResponse::from_text("hello");
        assert_eq!(response.text(), Some("hello"));
        assert_eq!(response.message().map(|m| m.role), Some(Role::Assistant));
        assert!(response.tool_calls().is_empty());
        assert_eq!(response.choices[0].finish_reason.as_deref(), Some("stop"));
    }
}
