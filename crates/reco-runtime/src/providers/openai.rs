//! OpenAI Chat Completions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;

use super::{
    factory::ProviderFactory, secrets::ApiCredential, ChatMessage, CompletionConfig,
    CompletionResponse, LlmProvider, ProviderError, TokenUsage,
};

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Debug)]
pub struct OpenAiProvider {
    credential: ApiCredential,
    base_url: String,
    http: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            credential: ApiCredential::explicit(api_key, OPENAI_API_KEY_ENV),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_settings(settings: &JsonValue) -> Result<Self, ProviderError> {
        Ok(Self {
            credential: ApiCredential::resolve(settings, OPENAI_API_KEY_ENV)?,
            base_url: settings["base_url"]
                .as_str()
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            http: reqwest::Client::new(),
        })
    }
}

/// System turns stay in `messages`, so the chat messages serialize as-is.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Reply,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

fn request_body<'a>(
    messages: &'a [ChatMessage],
    config: &'a CompletionConfig,
) -> ChatCompletionRequest<'a> {
    ChatCompletionRequest {
        model: config.model_or(DEFAULT_MODEL),
        messages,
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    }
}

fn error_from_body(status: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        // `code` carries "insufficient_quota"; `type` is coarser
        Ok(ErrorEnvelope { error }) => {
            let code = error.code.or(error.kind);
            ProviderError::from_status(status, code.as_deref(), error.message)
        }
        Err(_) => ProviderError::from_status(status, None, body.to_string()),
    }
}

fn into_response(body: ChatCompletion) -> Result<CompletionResponse, ProviderError> {
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::ParseError("response has no choices".into()))?;

    let usage = body.usage.map_or_else(TokenUsage::default, |u| TokenUsage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
        ..TokenUsage::default()
    });

    Ok(CompletionResponse {
        content: choice.message.content.unwrap_or_default(),
        usage,
        model: body.model,
        stop_reason: choice.finish_reason,
    })
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.credential.expose())
            .timeout(config.timeout)
            .json(&request_body(&messages, config))
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(e, config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_body(status.as_u16(), &body));
        }

        let body: ChatCompletion = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
        into_response(body)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

pub struct OpenAiProviderFactory;

impl ProviderFactory for OpenAiProviderFactory {
    fn provider_type(&self) -> &'static str {
        "openai"
    }

    fn default_model(&self) -> &'static str {
        DEFAULT_MODEL
    }

    fn create(&self, settings: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        Ok(Arc::new(OpenAiProvider::from_settings(settings)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_turn_stays_in_messages() {
        let messages = vec![ChatMessage::system("평가 전문가"), ChatMessage::user("추천서")];
        let config = CompletionConfig::for_evaluation();

        let json = serde_json::to_value(request_body(&messages, &config)).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "추천서");
        assert_eq!(json["max_tokens"], 500);
        assert_eq!(json["model"], "gpt-4o");
    }

    #[test]
    fn test_insufficient_quota_code() {
        let body = r#"{"error": {"message": "You exceeded your current quota", "type": "insufficient_quota", "code": "insufficient_quota"}}"#;
        assert!(matches!(
            error_from_body(429, body),
            ProviderError::QuotaExceeded(_)
        ));
    }

    #[test]
    fn test_plain_429_is_rate_limit() {
        let body = r#"{"error": {"message": "Rate limit reached for requests", "type": "requests", "code": "rate_limit_exceeded"}}"#;
        assert!(matches!(
            error_from_body(429, body),
            ProviderError::RateLimited { retry_after: None }
        ));
    }

    #[test]
    fn test_usage_maps_to_input_output() {
        let body: ChatCompletion = serde_json::from_str(
            r#"{"model":"gpt-4o-2024-08-06","choices":[{"message":{"content":"정확성: 4점"},"finish_reason":"stop"}],"usage":{"prompt_tokens":120,"completion_tokens":30}}"#,
        )
        .unwrap();
        let response = into_response(body).unwrap();

        assert_eq!(response.content, "정확성: 4점");
        assert_eq!(response.usage.total(), 150);
        assert_eq!(response.stop_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_no_choices_is_parse_error() {
        let body: ChatCompletion = serde_json::from_str(r#"{"model":"gpt-4o","choices":[]}"#).unwrap();
        assert!(matches!(into_response(body), Err(ProviderError::ParseError(_))));
    }

    #[test]
    fn test_factory_create() {
        let provider = OpenAiProviderFactory
            .create(&serde_json::json!({ "api_key": "sk-test" }))
            .unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(OpenAiProviderFactory.default_model(), "gpt-4o");
    }
}
