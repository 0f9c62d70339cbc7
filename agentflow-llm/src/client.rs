//! The chat completion capability and its HTTP implementation.

use agentflow_core::message::Message;
use async_trait::async_trait;
use reqwest::{
    Method,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::{
    config::{ClientSettings, ClientVariant},
    error::{LlmError, Result},
    request::{ChatRequest, ModelParameters},
    response::ChatResponse,
};

/// Anything that can complete a chat.
///
/// Every agent pattern takes this capability by injection so it can run
/// against a live endpoint or a stub.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Send a request and return the raw response.
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Model or deployment name used when a request does not name one.
    fn model(&self) -> &str;

    /// Send `messages` and return the first choice's text.
    async fn complete_text(
        &self,
        messages: Vec<Message>,
        parameters: ModelParameters,
    ) -> Result<String> {
        let request = ChatRequest::new(messages).with_parameters(parameters);
        let response = self.complete(request).await?;
        response
            .into_message()
            .map(|message| message.content.unwrap_or_default())
            .ok_or(LlmError::EmptyResponse)
    }
}

/// HTTP client for OpenAI-compatible endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
    headers: HeaderMap,
    variant: ClientVariant,
    model: String,
}

impl OpenAiClient {
    /// Build a client for the given settings.
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let variant = settings.variant();
        let base = settings.endpoint.trim_end_matches('/');
        let endpoint = match &variant {
            ClientVariant::ApiKey => format!("{base}/chat/completions"),
            ClientVariant::Versioned { .. } => format!(
                "{base}/openai/deployments/{}/chat/completions",
                settings.model
            ),
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let invalid_key = |_| LlmError::configuration("API key contains invalid header characters");
        match &variant {
            ClientVariant::ApiKey => {
                let value = HeaderValue::from_str(&format!("Bearer {}", settings.api_key))
                    .map_err(invalid_key)?;
                headers.insert(AUTHORIZATION, value);
            }
            ClientVariant::Versioned { .. } => {
                let value = HeaderValue::from_str(&settings.api_key).map_err(invalid_key)?;
                headers.insert("api-key", value);
            }
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            endpoint,
            headers,
            variant,
            model: settings.model.clone(),
        })
    }

    /// The variant this client speaks.
    pub fn variant(&self) -> &ClientVariant {
        &self.variant
    }

    /// Full chat completions URL, without query parameters.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    async fn complete(&self, mut request: ChatRequest) -> Result<ChatResponse> {
        if request.model.is_none() {
            request.model = Some(self.model.clone());
        }
        #[cfg(feature = "metrics")]
        metrics::counter!("agentflow_chat_requests_total").increment(1);

        debug!(
            endpoint = %self.endpoint,
            messages = request.messages.len(),
            tools = request.tools.as_ref().map_or(0, Vec::len),
            "sending chat completion"
        );
        if let Ok(body) = serde_json::to_string(&request) {
            trace!("request: {body}");
        }

        let mut builder = self
            .client
            .request(Method::POST, &self.endpoint)
            .headers(self.headers.clone())
            .json(&request);
        if let ClientVariant::Versioned { api_version } = &self.variant {
            builder = builder.query(&[("api-version", api_version.as_str())]);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        trace!("response: {text}");

        if !status.is_success() {
            #[cfg(feature = "metrics")]
            metrics::counter!("agentflow_chat_errors_total").increment(1);

            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            warn!(status = status.as_u16(), %message, "chat completion failed");
            return Err(LlmError::api(status.as_u16(), message));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)?;
        if parsed.choices.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(parsed)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Build a client from settings, or `None` when it cannot be constructed.
pub fn build_client(settings: &ClientSettings) -> Option<OpenAiClient> {
    match OpenAiClient::new(settings) {
        Ok(client) => Some(client),
        Err(error) => {
            warn!(%error, "failed to initialize chat client");
            None
        }
    }
}

/// Build a client from the process environment.
///
/// Returns `None` when the endpoint or key is not configured.
pub fn client_from_env() -> Option<OpenAiClient> {
    ClientSettings::from_env().and_then(|settings| build_client(&settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_variant_endpoint_and_auth() {
        let settings = ClientSettings::new(
            "https://res.cognitiveservices.azure.com/openai/v1/",
            "secret",
        );
        let client = OpenAiClient::new(&settings).unwrap();

        assert_eq!(client.variant(), &ClientVariant::ApiKey);
        assert_eq!(
            client.endpoint(),
            "https://res.cognitiveservices.azure.com/openai/v1/chat/completions"
        );
        assert_eq!(
            client.headers.get(AUTHORIZATION).unwrap(),
            "Bearer secret"
        );
        assert!(client.headers.get("api-key").is_none());
    }

    #[test]
    fn test_versioned_variant_endpoint_and_auth() {
        let settings =
            ClientSettings::new("https://res.openai.azure.com", "secret").with_model("gpt-4o");
        let client = OpenAiClient::new(&settings).unwrap();

        assert!(matches!(client.variant(), ClientVariant::Versioned { .. }));
        assert_eq!(
            client.endpoint(),
            "https://res.openai.azure.com/openai/deployments/gpt-4o/chat/completions"
        );
        assert_eq!(client.headers.get("api-key").unwrap(), "secret");
        assert_eq!(client.model(), "gpt-4o");
    }

    #[test]
    fn test_invalid_key_yields_no_client() {
        let settings = ClientSettings::new("https://res.openai.azure.com", "bad\nkey");
        assert!(build_client(&settings).is_none());
    }
}
