//! Rubric evaluation of finished letters.
//!
//! The orchestrator implements:
//! - Rubric composition, one judge call, score extraction and aggregation
//! - Bounded concurrent batches with results in input order
//!
//! All numbers come from `reco-core`; this layer only moves text around.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;

use reco_core::{compose_rubric, score_response, EvaluationResult, EvaluationSummary};

use crate::client::{GenerationClient, GenerationError};
use crate::config::RuntimeConfig;
use crate::providers::LlmProvider;

const DEFAULT_CONCURRENCY: usize = 4;

/// Outcome of a batch: one entry per input document, in input order.
#[derive(Debug)]
pub struct BatchEvaluation {
    pub outcomes: Vec<Result<EvaluationResult, GenerationError>>,
}

impl BatchEvaluation {
    /// Summary over the documents that were scored.
    pub fn summary(&self) -> Option<EvaluationSummary> {
        let scored: Vec<EvaluationResult> = self
            .outcomes
            .iter()
            .filter_map(|outcome| outcome.as_ref().ok().cloned())
            .collect();
        EvaluationSummary::from_results(&scored)
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_err()).count()
    }
}

/// Scores letters against the five-criterion rubric.
#[derive(Debug, Clone)]
pub struct EvaluationOrchestrator {
    client: GenerationClient,
    deadline: Option<Duration>,
    concurrency: usize,
}

impl EvaluationOrchestrator {
    pub fn new(client: GenerationClient) -> Self {
        Self {
            client,
            deadline: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Orchestrator using the `evaluation` settings of `config`.
    pub fn from_config(provider: Arc<dyn LlmProvider>, config: &RuntimeConfig) -> Self {
        let client = GenerationClient::new(provider, config.evaluation.clone(), config.retry);
        Self {
            client,
            deadline: config.deadline,
            concurrency: config.batch_concurrency.max(1),
        }
    }

    /// Maximum evaluations in flight during a batch (at least one).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Evaluate one letter.
    ///
    /// Client failures propagate unchanged. A judge answer that omits some
    /// criteria still produces a result, with warnings.
    pub async fn evaluate(&self, document_text: &str) -> Result<EvaluationResult, GenerationError> {
        let prompt = compose_rubric(document_text);

        let completion = match self.deadline {
            Some(deadline) => self.client.generate_with_deadline(&prompt, deadline).await?,
            None => self.client.generate(&prompt).await?,
        };

        let result = score_response(&completion.text, Utc::now());
        tracing::info!(
            average = result.average_score,
            percentage = result.percentage,
            warnings = result.warnings.len(),
            attempts = completion.attempts_used,
            "Letter evaluated"
        );
        Ok(result)
    }

    /// Evaluate independent letters concurrently.
    pub async fn evaluate_batch<S>(&self, documents: &[S]) -> BatchEvaluation
    where
        S: AsRef<str>,
    {
        tracing::info!(
            documents = documents.len(),
            concurrency = self.concurrency,
            "Starting batch evaluation"
        );

        let mut indexed: Vec<(usize, Result<EvaluationResult, GenerationError>)> =
            stream::iter(documents.iter().enumerate())
                .map(|(index, document)| async move {
                    (index, self.evaluate(document.as_ref()).await)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        indexed.sort_by_key(|(index, _)| *index);

        BatchEvaluation {
            outcomes: indexed.into_iter().map(|(_, outcome)| outcome).collect(),
        }
    }
}
