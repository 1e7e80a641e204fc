//! Anthropic Messages API.
//!
//! The system turn travels in the top-level `system` field; overload
//! (529 / `overloaded_error`) and quota failures are told apart here so the
//! retry layer can act on them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

use super::{
    factory::ProviderFactory, secrets::ApiCredential, ChatMessage, CompletionConfig,
    CompletionResponse, LlmProvider, ProviderError, Role, TokenUsage,
};

pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-sonnet-4-5";

#[derive(Debug)]
pub struct AnthropicProvider {
    credential: ApiCredential,
    base_url: String,
    http: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            credential: ApiCredential::explicit(api_key, ANTHROPIC_API_KEY_ENV),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Build from provider settings (`api_key`, `base_url`), with the key
    /// falling back to `ANTHROPIC_API_KEY`.
    pub fn from_settings(settings: &JsonValue) -> Result<Self, ProviderError> {
        Ok(Self {
            credential: ApiCredential::resolve(settings, ANTHROPIC_API_KEY_ENV)?,
            base_url: settings["base_url"]
                .as_str()
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            http: reqwest::Client::new(),
        })
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Turn<'a>>,
}

#[derive(Debug, Serialize)]
struct Turn<'a> {
    role: Role,
    content: [TextBlock<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextBlock<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_control: Option<Ephemeral>,
}

#[derive(Debug, Serialize)]
struct Ephemeral {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    model: String,
    #[serde(default)]
    content: Vec<ResponseBlock>,
    stop_reason: Option<String>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
    #[serde(default)]
    cache_read_input_tokens: u32,
    #[serde(default)]
    cache_creation_input_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

fn request_body<'a>(messages: &'a [ChatMessage], config: &'a CompletionConfig) -> MessagesRequest<'a> {
    let system = messages
        .iter()
        .find(|m| m.role == Role::System)
        .map(|m| m.content.as_str());

    let turns = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| Turn {
            role: m.role,
            content: [TextBlock {
                kind: "text",
                text: &m.content,
                cache_control: config.prompt_caching.then_some(Ephemeral { kind: "ephemeral" }),
            }],
        })
        .collect();

    MessagesRequest {
        model: config.model_or(DEFAULT_MODEL),
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        system,
        messages: turns,
    }
}

/// Turn a non-2xx response into a provider error.
fn error_from_body(status: u16, retry_after: Option<Duration>, body: &str) -> ProviderError {
    let (kind, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (Some(envelope.error.kind), envelope.error.message),
        Err(_) => (None, body.to_string()),
    };

    match ProviderError::from_status(status, kind.as_deref(), message) {
        ProviderError::RateLimited { .. } => ProviderError::RateLimited { retry_after },
        other => other,
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let response = self
            .http
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", self.credential.expose())
            .header("anthropic-version", API_VERSION)
            .timeout(config.timeout)
            .json(&request_body(&messages, config))
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(e, config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .map(Duration::from_secs);
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_body(status.as_u16(), retry_after, &body));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(CompletionResponse {
            content: body.content.into_iter().filter_map(|b| b.text).collect(),
            usage: TokenUsage {
                input_tokens: body.usage.input_tokens,
                output_tokens: body.usage.output_tokens,
                cache_read_tokens: body.usage.cache_read_input_tokens,
                cache_write_tokens: body.usage.cache_creation_input_tokens,
            },
            model: body.model,
            stop_reason: body.stop_reason,
        })
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

/// Settings: `{ "api_key": "...", "base_url": "https://..." }`, both optional.
pub struct AnthropicProviderFactory;

impl ProviderFactory for AnthropicProviderFactory {
    fn provider_type(&self) -> &'static str {
        "anthropic"
    }

    fn default_model(&self) -> &'static str {
        DEFAULT_MODEL
    }

    fn validate_config(&self, settings: &JsonValue) -> Result<(), ProviderError> {
        match settings["base_url"].as_str() {
            Some(url) if !url.starts_with("https://") && !url.starts_with("http://") => Err(
                ProviderError::NotConfigured(format!("base_url is not an http(s) URL: {url}")),
            ),
            _ => Ok(()),
        }
    }

    fn create(&self, settings: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        Ok(Arc::new(AnthropicProvider::from_settings(settings)?))
    }
}
