//! # reco-runtime
//!
//! LLM invocation for reco: letter generation and rubric evaluation.
//!
//! `reco-core` decides *what* to ask and how to read the answer; this crate
//! sends the question. It provides:
//! - A provider abstraction with Anthropic and OpenAI implementations
//!   (features `anthropic`, `openai`)
//! - [`GenerationClient`]: overload-only retry on a linear backoff
//! - [`DocumentGenerator`]: generate, refine and style-analysis flows
//! - [`EvaluationOrchestrator`]: rubric scoring, single or batched
//!
//! ## Example
//!
//! ```rust,ignore
//! use reco_runtime::{DocumentGenerator, EvaluationOrchestrator, RuntimeConfig};
//!
//! let mut config = RuntimeConfig::from_file("reco.yaml")?;
//! let provider = config.build_provider()?;
//!
//! let generator = DocumentGenerator::from_config(provider.clone(), &config);
//! let letter = generator.generate_document(&request).await?;
//!
//! let evaluator = EvaluationOrchestrator::from_config(provider, &config);
//! let result = evaluator.evaluate(&letter.text).await?;
//! println!("{}%", result.percentage);
//! ```

pub mod client;
pub mod config;
pub mod generator;
pub mod orchestrator;
pub mod providers;
pub mod resilience;

pub use client::{Completion, ErrorKind, GenerationClient, GenerationError};
pub use config::{ConfigError, ProviderSettings, RuntimeConfig};
pub use generator::{DocumentGenerator, GenerationResult};
pub use orchestrator::{BatchEvaluation, EvaluationOrchestrator};
pub use providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
    ProviderRegistry, Role, TokenUsage,
};
pub use resilience::{classify, FailureKind, RetryPolicy};
