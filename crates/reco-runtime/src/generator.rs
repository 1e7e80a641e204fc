//! Letter generation, refinement and style analysis.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use reco_core::{
    compose_generation, compose_refine, compose_style_analysis, parse_style_profile,
    ComposedPrompt, GenerationRequest, Intensity, StyleProfile, Tone,
};

use crate::client::{Completion, GenerationClient, GenerationError};
use crate::config::RuntimeConfig;
use crate::providers::{LlmProvider, TokenUsage};

/// A generated letter and how it was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub text: String,
    pub attempts_used: u32,
    pub tone: Tone,
    pub intensity: Intensity,
    pub usage: TokenUsage,
    pub model: String,
}

/// Drives composed prompts for letters through a [`GenerationClient`].
#[derive(Debug, Clone)]
pub struct DocumentGenerator {
    client: GenerationClient,
    deadline: Option<Duration>,
}

impl DocumentGenerator {
    pub fn new(client: GenerationClient) -> Self {
        Self {
            client,
            deadline: None,
        }
    }

    /// Generator using the `generation` settings of `config`.
    pub fn from_config(provider: Arc<dyn LlmProvider>, config: &RuntimeConfig) -> Self {
        let client = GenerationClient::new(provider, config.generation.clone(), config.retry);
        Self {
            client,
            deadline: config.deadline,
        }
    }

    /// Bound every call by `deadline`, retries included.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Generate a letter dated today (local time).
    pub async fn generate_document(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        self.generate_document_on(request, Local::now().date_naive())
            .await
    }

    /// Generate a letter dated `written_on`.
    pub async fn generate_document_on(
        &self,
        request: &GenerationRequest,
        written_on: NaiveDate,
    ) -> Result<GenerationResult, GenerationError> {
        let prompt = compose_generation(request, written_on)?;
        tracing::info!(
            tone = %request.tone,
            intensity = %request.intensity,
            target_length = ?request.target_length,
            "Generating recommendation letter"
        );

        let completion = require_letter(self.run(&prompt).await?)?;

        Ok(GenerationResult {
            text: completion.text,
            attempts_used: completion.attempts_used,
            tone: request.tone,
            intensity: request.intensity,
            usage: completion.usage,
            model: completion.model,
        })
    }

    /// Rework a user-edited letter according to `improvement_notes`.
    pub async fn refine_document(
        &self,
        current_content: &str,
        improvement_notes: &str,
        tone: Tone,
    ) -> Result<Completion, GenerationError> {
        let prompt = compose_refine(current_content, improvement_notes, tone);
        tracing::info!(tone = %tone, "Refining recommendation letter");
        require_letter(self.run(&prompt).await?)
    }

    /// Extract a [`StyleProfile`] from a sample of the recommender's writing.
    pub async fn analyze_style(&self, sample: &str) -> Result<StyleProfile, GenerationError> {
        let prompt = compose_style_analysis(sample);
        let completion = self.run(&prompt).await?;
        Ok(parse_style_profile(&completion.text)?)
    }

    async fn run(&self, prompt: &ComposedPrompt) -> Result<Completion, GenerationError> {
        match self.deadline {
            Some(deadline) => self.client.generate_with_deadline(prompt, deadline).await,
            None => self.client.generate(prompt).await,
        }
    }
}

/// A letter flow has nothing to hand back when the model answers blank.
fn require_letter(completion: Completion) -> Result<Completion, GenerationError> {
    if completion.text.trim().is_empty() {
        tracing::warn!(model = %completion.model, "Provider returned a blank letter");
        return Err(GenerationError::EmptyResponse);
    }
    Ok(completion)
}
