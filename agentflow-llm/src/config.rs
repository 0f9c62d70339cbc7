//! Connection settings and client variant selection.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable holding the endpoint URL.
pub const ENDPOINT_VAR: &str = "AZURE_AI_ENDPOINT";
/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "AZURE_AI_API_KEY";
/// Environment variable holding the model or deployment name.
pub const MODEL_VAR: &str = "AZURE_AI_MODEL_NAME";
/// Environment variable holding the versioned API's version string.
pub const API_VERSION_VAR: &str = "AZURE_OPENAI_API_VERSION";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4";
/// API version used by the versioned variant when none is configured.
pub const DEFAULT_API_VERSION: &str = "2024-02-15-preview";

/// Endpoints whose URL contains this marker take the plain API-key variant.
const API_KEY_ENDPOINT_MARKER: &str = "cognitiveservices";

/// Which flavour of the OpenAI-compatible API an endpoint speaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientVariant {
    /// `{endpoint}/chat/completions` authenticated with a bearer key.
    ApiKey,
    /// `{endpoint}/openai/deployments/{model}/chat/completions?api-version=...`
    /// authenticated with an `api-key` header.
    Versioned {
        /// Value of the `api-version` query parameter.
        api_version: String,
    },
}

impl ClientVariant {
    /// Pick the variant from the endpoint URL.
    pub fn select(endpoint: &str, api_version: &str) -> Self {
        if endpoint.contains(API_KEY_ENDPOINT_MARKER) {
            Self::ApiKey
        } else {
            Self::Versioned {
                api_version: api_version.to_string(),
            }
        }
    }
}

/// Settings needed to reach the chat completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub api_version: String,
    /// Request timeout; `None` keeps the HTTP client's default.
    #[serde(default)]
    pub timeout: Option<Duration>,
}

impl ClientSettings {
    /// Create settings with the default model and API version.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read settings from the process environment.
    ///
    /// Returns `None` when the endpoint or key is missing or empty.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let present = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let endpoint = present(ENDPOINT_VAR)?;
        let api_key = present(API_KEY_VAR)?;
        let mut settings = Self::new(endpoint, api_key);
        if let Some(model) = present(MODEL_VAR) {
            settings.model = model;
        }
        if let Some(api_version) = present(API_VERSION_VAR) {
            settings.api_version = api_version;
        }
        Some(settings)
    }

    /// The client variant these settings select.
    pub fn variant(&self) -> ClientVariant {
        ClientVariant::select(&self.endpoint, &self.api_version)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_cognitiveservices_endpoint_uses_api_key_variant() {
        let variant = ClientVariant::select(
            "https://my-resource.cognitiveservices.azure.com/openai/v1",
            DEFAULT_API_VERSION,
        );
        assert_eq!(variant, ClientVariant::ApiKey);
    }

    #[test]
    fn test_other_endpoint_uses_versioned_variant() {
        let variant = ClientVariant::select("https://my-resource.openai.azure.com", "2024-06-01");
        assert_eq!(
            variant,
            ClientVariant::Versioned {
                api_version: "2024-06-01".to_string()
            }
        );
    }

    #[test]
    fn test_missing_key_or_endpoint_yields_none() {
        assert!(ClientSettings::from_lookup(lookup(&[(ENDPOINT_VAR, "https://x")])).is_none());
        assert!(ClientSettings::from_lookup(lookup(&[(API_KEY_VAR, "secret")])).is_none());
        assert!(
            ClientSettings::from_lookup(lookup(&[(ENDPOINT_VAR, "https://x"), (API_KEY_VAR, "")]))
                .is_none()
        );
    }

    #[test]
    fn test_defaults_and_overrides() {
        let settings =
            ClientSettings::from_lookup(lookup(&[(ENDPOINT_VAR, "https://x"), (API_KEY_VAR, "k")]))
                .unwrap();
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.api_version, DEFAULT_API_VERSION);
        assert_eq!(settings.timeout, None);
        assert_eq!(
            settings.clone().with_timeout(Duration::from_secs(30)).timeout,
            Some(Duration::from_secs(30))
        );

        let settings = ClientSettings::from_lookup(lookup(&[
            (ENDPOINT_VAR, "https://x"),
            (API_KEY_VAR, "k"),
            (MODEL_VAR, "gpt-4o"),
            (API_VERSION_VAR, "2024-10-21"),
        ]))
        .unwrap();
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(
            settings.variant(),
            ClientVariant::Versioned {
                api_version: "2024-10-21".to_string()
            }
        );
    }
}
