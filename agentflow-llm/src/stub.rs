//! Offline chat completion backends.

use std::fmt;

use async_trait::async_trait;

use crate::{
    client::ChatCompletion, error::Result, request::ChatRequest, response::ChatResponse,
};

/// A [`ChatCompletion`] backed by a closure.
///
/// Used by tests and by the command line's offline mode.
pub struct FnChat<F>
where
    F: Fn(ChatRequest) -> Result<ChatResponse> + Send + Sync,
{
    func: F,
    model: String,
}

impl<F> FnChat<F>
where
    F: Fn(ChatRequest) -> Result<ChatResponse> + Send + Sync,
{
    /// Create a stub that answers every request with `func`.
    pub fn new(func: F) -> Self {
        Self {
            func,
            model: "stub".to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl<F> fmt::Debug for FnChat<F>
where
    F: Fn(ChatRequest) -> Result<ChatResponse> + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnChat").field("model", &self.model).finish()
    }
}

#[async_trait]
impl<F> ChatCompletion for FnChat<F>
where
    F: Fn(ChatRequest) -> Result<ChatResponse> + Send + Sync,
{
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        (self.func)(request)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// A stub that replies `echo:{content of the last message}`.
pub fn echo_chat() -> FnChat<impl Fn(ChatRequest) -> Result<ChatResponse> + Send + Sync> {
    FnChat::new(|request: ChatRequest| {
        Ok(ChatResponse::from_text(format!(
            "echo:{}",
            request.last_text()
        )))
    })
    .with_model("echo")
}

#[cfg(test)]
mod tests {
    use agentflow_core::message::Message;

    use super::*;
    use crate::{error::LlmError, request::ModelParameters};

    #[tokio::test]
    async fn test_echo_chat() {
        let chat = echo_chat();
        let text = chat
            .complete_text(
                vec![Message::system("sys"), Message::user("hello")],
                ModelParameters::default(),
            )
            .await
            .unwrap();

        assert_eq!(text, "echo:hello");
        assert_eq!(chat.model(), "echo");
    }

    #[tokio::test]
    async fn test_failing_stub() {
        let chat = FnChat::new(|_request| Err(LlmError::api(500, "down")));
        let err = chat
            .complete_text(vec![Message::user("x")], ModelParameters::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "API error (500): down");
    }
}
