//! Generation client: one prompt in, one completion out, with retries.
//!
//! Only overload failures are retried, on the linear schedule of
//! [`RetryPolicy`]. Quota and rate-limit failures surface immediately.

use backon::Retryable;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use reco_core::{ComposedPrompt, CoreError};

use crate::providers::{ChatMessage, CompletionConfig, LlmProvider, ProviderError, TokenUsage};
use crate::resilience::{classify, FailureKind, RetryPolicy};

/// Errors from a generation or evaluation call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Provider still overloaded after {attempts} attempts: {last}")]
    ExhaustedRetries { attempts: u32, last: ProviderError },

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(ProviderError),

    #[error("Rate limited: {0}")]
    RateLimited(ProviderError),

    #[error("Provider call failed: {0}")]
    Provider(ProviderError),

    #[error("Deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// The provider answered, but with no letter text.
    #[error("Provider returned an empty letter")]
    EmptyResponse,
}

/// Coarse failure class for callers that map errors onto transport codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    QuotaExceeded,
    RateLimited,
    Overloaded,
    DeadlineExceeded,
    Upstream,
}

impl ErrorKind {
    /// Suggested HTTP status.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::InvalidInput => 400,
            ErrorKind::RateLimited => 429,
            ErrorKind::QuotaExceeded | ErrorKind::Overloaded => 503,
            ErrorKind::DeadlineExceeded => 504,
            ErrorKind::Upstream => 502,
        }
    }
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::Core(_) => ErrorKind::InvalidInput,
            GenerationError::ExhaustedRetries { .. } => ErrorKind::Overloaded,
            GenerationError::QuotaExceeded(_) => ErrorKind::QuotaExceeded,
            GenerationError::RateLimited(_) => ErrorKind::RateLimited,
            GenerationError::DeadlineExceeded(_) => ErrorKind::DeadlineExceeded,
            GenerationError::Provider(_) | GenerationError::EmptyResponse => ErrorKind::Upstream,
        }
    }

    /// Message suitable for showing to the letter author.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::Core(e) => format!("요청 내용을 확인해주세요: {e}"),
            GenerationError::ExhaustedRetries { .. } => {
                "AI 서비스가 일시적으로 과부하 상태입니다. 잠시 후 다시 시도해주세요.".to_string()
            }
            GenerationError::QuotaExceeded(_) => {
                "AI 서비스 사용량 한도를 초과했습니다. 관리자에게 문의하거나 잠시 후 다시 시도해주세요."
                    .to_string()
            }
            GenerationError::RateLimited(_) => {
                "요청 빈도가 너무 높습니다. 잠시 후 다시 시도해주세요.".to_string()
            }
            GenerationError::DeadlineExceeded(_) => {
                "응답 시간이 초과되었습니다. 잠시 후 다시 시도해주세요.".to_string()
            }
            GenerationError::Provider(_) | GenerationError::EmptyResponse => {
                "추천서 생성 중 오류가 발생했습니다.".to_string()
            }
        }
    }
}

/// Successful provider answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    /// Model output, verbatim
    pub text: String,
    /// Attempts made, including the successful one
    pub attempts_used: u32,
    pub usage: TokenUsage,
    pub model: String,
}

/// Sends composed prompts to a provider with overload retries.
///
/// Holds no per-call state; clone it or share it freely.
#[derive(Clone)]
pub struct GenerationClient {
    provider: Arc<dyn LlmProvider>,
    config: CompletionConfig,
    retry: RetryPolicy,
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .field("retry", &self.retry)
            .finish()
    }
}

impl GenerationClient {
    pub fn new(provider: Arc<dyn LlmProvider>, config: CompletionConfig, retry: RetryPolicy) -> Self {
        Self {
            provider,
            config,
            retry,
        }
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Send `prompt`, retrying while the provider reports overload.
    pub async fn generate(&self, prompt: &ComposedPrompt) -> Result<Completion, GenerationError> {
        let messages = to_messages(prompt);
        let provider_name = self.provider.name().to_string();
        let mut attempts = 0u32;

        let outcome = (|| {
            attempts += 1;
            tracing::debug!(provider = %provider_name, attempt = attempts, "Calling provider");
            let provider = Arc::clone(&self.provider);
            let messages = messages.clone();
            let config = self.config.clone();
            async move { provider.complete(messages, &config).await }
        })
        .retry(self.retry)
        .sleep(tokio::time::sleep)
        .when(|e: &ProviderError| classify(e).is_retryable())
        .notify(|e: &ProviderError, delay: Duration| {
            tracing::warn!(
                provider = %provider_name,
                error = %e,
                delay = ?delay,
                "Provider overloaded, retrying"
            );
        })
        .await;

        match outcome {
            Ok(response) => {
                tracing::debug!(
                    provider = %provider_name,
                    attempts,
                    tokens = response.usage.total(),
                    "Completion received"
                );
                Ok(Completion {
                    text: response.content,
                    attempts_used: attempts,
                    usage: response.usage,
                    model: response.model,
                })
            }
            Err(error) => {
                tracing::warn!(provider = %provider_name, attempts, error = %error, "Provider call failed");
                Err(surface(error, attempts))
            }
        }
    }

    /// [`generate`](Self::generate) bounded by an outer deadline.
    ///
    /// The deadline covers every attempt and every backoff pause.
    pub async fn generate_with_deadline(
        &self,
        prompt: &ComposedPrompt,
        deadline: Duration,
    ) -> Result<Completion, GenerationError> {
        tokio::time::timeout(deadline, self.generate(prompt))
            .await
            .map_err(|_| GenerationError::DeadlineExceeded(deadline))?
    }
}

fn to_messages(prompt: &ComposedPrompt) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = prompt.system() {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(prompt.body()));
    messages
}

fn surface(error: ProviderError, attempts: u32) -> GenerationError {
    match classify(&error) {
        FailureKind::Overloaded => GenerationError::ExhaustedRetries {
            attempts,
            last: error,
        },
        FailureKind::QuotaExceeded => GenerationError::QuotaExceeded(error),
        FailureKind::RateLimited => GenerationError::RateLimited(error),
        FailureKind::Fatal => GenerationError::Provider(error),
    }
}
