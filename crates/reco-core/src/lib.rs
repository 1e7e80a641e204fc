//! # reco-core
//!
//! Deterministic prompt composition and rubric scoring for recommendation letters.
//!
//! This crate covers the two pure halves of the reco pipeline:
//! - Turning a structured [`GenerationRequest`] into a fully specified
//!   generation instruction ([`compose_generation`])
//! - Turning a judge's free-form rubric answer into normalized scores
//!   ([`score_response`])
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces the same prompt and scores
//! 2. **No LLM calls**: Invocation lives in `reco-runtime`
//! 3. **Never blocks on judge output**: Unparseable criteria fall back to 3
//!
//! ## Example
//!
//! ```rust,ignore
//! use reco_core::{GenerationRequest, compose_generation, score_response};
//!
//! let request = GenerationRequest::from_file("request.yaml")?;
//! let prompt = compose_generation(&request, chrono::Local::now().date_naive())?;
//!
//! // ... send prompt.body() to a provider, then later:
//! let result = score_response(judge_answer, chrono::Utc::now());
//! println!("{}%", result.percentage);
//! ```

pub mod length;
pub mod prompts;
pub mod request;
pub mod scoring;
pub mod style;
pub mod tone;

// Re-export main types at crate root
pub use length::{plan, LengthPlan};
pub use prompts::{
    compose_generation, compose_refine, compose_rubric, compose_style_analysis, ComposedPrompt,
};
pub use request::{
    Award, Certification, DetailSections, Experience, GenerationRequest, Intensity, Project,
    Strength,
};
pub use scoring::{
    aggregate, Aggregate, EvaluationCriterion, EvaluationResult, EvaluationSummary,
    ExtractionWarning, Improvement, Score, ScoreExtraction, ScoreExtractor, ScoreSet,
};
pub use style::{inject, parse_style_profile, ClosingConstraint, StyleProfile};
pub use tone::{Tone, ToneCatalog, ToneDescriptor};

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised by the deterministic core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown tone: {0}")]
    UnknownTone(String),

    #[error("Style analysis response could not be parsed: {0}")]
    StyleAnalysis(String),
}

/// Score a judge response.
///
/// Runs extraction, aggregation and improvement advice over `raw_response`
/// and stamps the result with `evaluated_at`. Never fails: criteria the
/// judge did not answer degrade to the default score with a warning.
pub fn score_response(raw_response: &str, evaluated_at: DateTime<Utc>) -> EvaluationResult {
    let ScoreExtraction { scores, warnings } = ScoreExtractor::new().extract(raw_response);
    let Aggregate {
        average_score,
        percentage,
    } = aggregate(&scores);
    let improvements = scoring::advise(&scores, average_score, raw_response);

    EvaluationResult {
        scores,
        average_score,
        percentage,
        raw_response: raw_response.to_string(),
        evaluated_at,
        warnings,
        improvements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "정확성: 4점 - 사실 위주로 서술됨\n\
        전문성: 5점 - 문장이 매끄러움\n\
        논리성: 4점 - 흐름이 자연스러움\n\
        개인화: 3점 - 일반적 칭찬이 섞여 있음\n\
        설득력: 4점 - 추천 의사가 명확함";

    #[test]
    fn test_score_response_end_to_end() {
        let result = score_response(WELL_FORMED, Utc::now());

        assert_eq!(result.scores.accuracy.value(), 4);
        assert_eq!(result.scores.professionalism.value(), 5);
        assert_eq!(result.scores.personalization.value(), 3);
        assert!(result.warnings.is_empty());
        assert_eq!(result.average_score, 4.0);
        assert_eq!(result.percentage, 75.0);
        assert_eq!(result.raw_response, WELL_FORMED);
    }

    #[test]
    fn test_score_response_empty_judge_answer() {
        let result = score_response("", Utc::now());

        assert_eq!(result.warnings.len(), 5);
        assert_eq!(result.average_score, 3.0);
        assert_eq!(result.percentage, 50.0);
    }

    #[test]
    fn test_score_response_produces_improvements_below_threshold() {
        let result = score_response(WELL_FORMED, Utc::now());

        // Four criteria below 5, lowest first
        assert_eq!(result.improvements.len(), 4);
        assert_eq!(
            result.improvements[0].criterion,
            EvaluationCriterion::Personalization
        );
        assert_eq!(result.improvements[0].reason, "일반적 칭찬이 섞여 있음");
    }
}
