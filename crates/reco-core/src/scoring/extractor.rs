use serde::{Deserialize, Serialize};
use tracing::warn;

use super::patterns::{patterns_for, ScorePattern};
use super::{EvaluationCriterion, ExtractionWarning, Score, ScoreSet};

/// Length of the response excerpt attached to extraction warnings.
pub const EXCERPT_CHARS: usize = 200;

/// Scores pulled from one judge response, plus the criteria that fell back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreExtraction {
    pub scores: ScoreSet,
    pub warnings: Vec<ExtractionWarning>,
}

/// Extracts per-criterion scores from free-form judge text.
///
/// Never fails. A criterion no pattern matches gets [`Score::DEFAULT`] and a
/// warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreExtractor;

impl ScoreExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, raw: &str) -> ScoreExtraction {
        let mut warnings = Vec::new();

        let scores = ScoreSet::from_fn(|criterion| match find_score(criterion, raw) {
            Some(score) => score,
            None => {
                let excerpt: String = raw.chars().take(EXCERPT_CHARS).collect();
                warn!(
                    criterion = %criterion,
                    default = Score::DEFAULT.value(),
                    excerpt = %excerpt,
                    "No score found for criterion, applying default"
                );
                warnings.push(ExtractionWarning {
                    criterion,
                    default_applied: Score::DEFAULT,
                    excerpt,
                });
                Score::DEFAULT
            }
        });

        ScoreExtraction { scores, warnings }
    }
}

fn find_score(criterion: EvaluationCriterion, raw: &str) -> Option<Score> {
    patterns_for(criterion).find_map(|pattern| capture_digit(pattern, raw))
}

fn capture_digit(pattern: &ScorePattern, raw: &str) -> Option<Score> {
    let digit = pattern.regex.captures(raw)?.get(1)?.as_str();
    digit.parse::<i64>().ok().map(Score::clamped)
}
