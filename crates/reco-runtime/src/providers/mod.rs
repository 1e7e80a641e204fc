//! LLM providers.
//!
//! Everything above this module talks to a model through [`LlmProvider`];
//! HTTP details, credentials and vendor error formats stay in here.
//! Concrete providers are compiled in by feature (`anthropic`, `openai`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

mod factory;
pub mod secrets;

#[cfg(feature = "anthropic")]
mod anthropic;

#[cfg(feature = "openai")]
mod openai;

pub use factory::{ProviderFactory, ProviderRegistry};
pub use secrets::{ApiCredential, CredentialSource};

#[cfg(feature = "anthropic")]
pub use anthropic::{AnthropicProvider, AnthropicProviderFactory, ANTHROPIC_API_KEY_ENV};

#[cfg(feature = "openai")]
pub use openai::{OpenAiProvider, OpenAiProviderFactory, OPENAI_API_KEY_ENV};

/// Errors from LLM providers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// HTTP 529 or `overloaded_error`.
    #[error("Provider overloaded: {0}")]
    Overloaded(String),

    #[error("Insufficient quota: {0}")]
    QuotaExceeded(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Malformed provider response: {0}")]
    ParseError(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Map a failed HTTP exchange onto a provider error.
    ///
    /// `error_type` is the vendor's machine-readable error code, when the
    /// body carried one.
    pub fn from_status(status: u16, error_type: Option<&str>, message: String) -> Self {
        let quota = error_type == Some("insufficient_quota")
            || message.to_lowercase().contains("quota");

        match (status, error_type) {
            (529, _) | (_, Some("overloaded_error")) => Self::Overloaded(message),
            (429, _) if quota => Self::QuotaExceeded(message),
            (429, _) => Self::RateLimited { retry_after: None },
            (401 | 403, _) => Self::AuthError,
            _ => Self::ApiError { status, message },
        }
    }

    /// Map a transport failure, keeping timeouts distinct.
    #[cfg(any(feature = "anthropic", feature = "openai"))]
    pub(crate) fn from_transport(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::HttpError(error.to_string())
        }
    }
}

/// Per-call model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Blank means the provider's default model
    pub model: String,

    pub max_tokens: u32,

    pub temperature: f32,

    /// Per-request HTTP timeout
    #[serde(with = "crate::config::duration_human")]
    pub timeout: Duration,

    /// Mark the user turn cacheable (Anthropic only)
    pub prompt_caching: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            max_tokens: 4096,
            temperature: 0.3,
            timeout: Duration::from_secs(120),
            prompt_caching: false,
        }
    }
}

impl CompletionConfig {
    /// Rubric judging: five short lines, so a small token cap.
    pub fn for_evaluation() -> Self {
        Self {
            max_tokens: 500,
            timeout: Duration::from_secs(60),
            ..Self::default()
        }
    }

    /// The configured model, or `fallback` when none is set.
    pub fn model_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.model.trim() {
            "" => fallback,
            model => model,
        }
    }
}

/// Speaker of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// What a provider sent back for one call.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub usage: TokenUsage,
    /// Model that actually answered
    pub model: String,
    pub stop_reason: Option<String>,
}

/// Token accounting for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    #[serde(default)]
    pub cache_read_tokens: u32,
    #[serde(default)]
    pub cache_write_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// A chat-completion backend.
///
/// One instance is shared by every concurrent generation and evaluation, so
/// implementations keep no per-call mutable state.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_serialize_lowercase() {
        let json = serde_json::to_value(ChatMessage::system("평가 전문가")).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(ChatMessage::user("추천서").role, Role::User);
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ProviderError::from_status(529, None, "busy".into()),
            ProviderError::Overloaded(_)
        ));
        assert!(matches!(
            ProviderError::from_status(500, Some("overloaded_error"), "Overloaded".into()),
            ProviderError::Overloaded(_)
        ));
        assert!(matches!(
            ProviderError::from_status(429, None, "You exceeded your current quota".into()),
            ProviderError::QuotaExceeded(_)
        ));
        assert!(matches!(
            ProviderError::from_status(429, Some("insufficient_quota"), "billing".into()),
            ProviderError::QuotaExceeded(_)
        ));
        assert!(matches!(
            ProviderError::from_status(429, Some("rate_limit_error"), "slow down".into()),
            ProviderError::RateLimited { .. }
        ));
        assert_eq!(
            ProviderError::from_status(403, None, "forbidden".into()),
            ProviderError::AuthError
        );
        assert!(matches!(
            ProviderError::from_status(400, None, "bad request".into()),
            ProviderError::ApiError { status: 400, .. }
        ));
    }

    #[test]
    fn test_evaluation_config_is_smaller() {
        let evaluation = CompletionConfig::for_evaluation();
        assert_eq!(evaluation.max_tokens, 500);
        assert_eq!(evaluation.model, CompletionConfig::default().model);
    }

    #[test]
    fn test_blank_model_falls_back() {
        let config = CompletionConfig::default();
        assert_eq!(config.model_or("gpt-4o"), "gpt-4o");

        let config = CompletionConfig {
            model: "claude-opus-4-1".to_string(),
            ..CompletionConfig::default()
        };
        assert_eq!(config.model_or("gpt-4o"), "claude-opus-4-1");
    }

    #[test]
    fn test_completion_config_from_yaml_uses_humantime() {
        let config: CompletionConfig =
            serde_yaml::from_str("model: claude-sonnet-4-5\ntimeout: 90s\n").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(90));
        assert_eq!(config.max_tokens, 4096);
    }
}
