//! Rubric scoring of a finished letter.
//!
//! A judge model answers the rubric prompt in free form. This module turns that
//! answer into one [`Score`] per [`EvaluationCriterion`]:
//!
//! 1. [`ScoreExtractor`] - pattern table lookup, default 3 on miss
//! 2. [`aggregate`] - mean and percentage
//! 3. [`advise`] - improvement notes for weak criteria
//!
//! None of these steps can fail.

mod advice;
mod aggregator;
mod extractor;
pub mod patterns;
mod summary;

pub use advice::{advise, Improvement, IMPROVEMENT_THRESHOLD};
pub use aggregator::{aggregate, round2, Aggregate};
pub use extractor::{ScoreExtraction, ScoreExtractor, EXCERPT_CHARS};
pub use summary::EvaluationSummary;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The five rubric criteria, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationCriterion {
    Accuracy,
    Professionalism,
    Coherence,
    Personalization,
    Persuasiveness,
}

impl EvaluationCriterion {
    pub const ALL: [EvaluationCriterion; 5] = [
        EvaluationCriterion::Accuracy,
        EvaluationCriterion::Professionalism,
        EvaluationCriterion::Coherence,
        EvaluationCriterion::Personalization,
        EvaluationCriterion::Persuasiveness,
    ];

    /// Korean label the judge is asked to answer with.
    pub fn label(&self) -> &'static str {
        match self {
            EvaluationCriterion::Accuracy => "정확성",
            EvaluationCriterion::Professionalism => "전문성",
            EvaluationCriterion::Coherence => "논리성",
            EvaluationCriterion::Personalization => "개인화",
            EvaluationCriterion::Persuasiveness => "설득력",
        }
    }

    /// Heading used in the rubric body.
    pub fn rubric_heading(&self) -> &'static str {
        match self {
            EvaluationCriterion::Coherence => "논리성/구조",
            other => other.label(),
        }
    }

    pub fn english_name(&self) -> &'static str {
        match self {
            EvaluationCriterion::Accuracy => "Accuracy",
            EvaluationCriterion::Professionalism => "Professionalism",
            EvaluationCriterion::Coherence => "Coherence",
            EvaluationCriterion::Personalization => "Personalization",
            EvaluationCriterion::Persuasiveness => "Persuasiveness",
        }
    }

    /// Machine key (snake_case), as serialized.
    pub fn key(&self) -> &'static str {
        match self {
            EvaluationCriterion::Accuracy => "accuracy",
            EvaluationCriterion::Professionalism => "professionalism",
            EvaluationCriterion::Coherence => "coherence",
            EvaluationCriterion::Personalization => "personalization",
            EvaluationCriterion::Persuasiveness => "persuasiveness",
        }
    }
}

impl fmt::Display for EvaluationCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// An integer score in `[1, 5]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Applied when the judge gave no usable score for a criterion.
    pub const DEFAULT: Score = Score(3);

    /// Clamp any integer into `[1, 5]`.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for Score {
    fn from(value: u8) -> Self {
        Self::clamped(i64::from(value))
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One score per criterion. Always complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub accuracy: Score,
    pub professionalism: Score,
    pub coherence: Score,
    pub personalization: Score,
    pub persuasiveness: Score,
}

impl ScoreSet {
    /// Build a set by asking for each criterion's score.
    pub fn from_fn(mut score_for: impl FnMut(EvaluationCriterion) -> Score) -> Self {
        Self {
            accuracy: score_for(EvaluationCriterion::Accuracy),
            professionalism: score_for(EvaluationCriterion::Professionalism),
            coherence: score_for(EvaluationCriterion::Coherence),
            personalization: score_for(EvaluationCriterion::Personalization),
            persuasiveness: score_for(EvaluationCriterion::Persuasiveness),
        }
    }

    pub fn get(&self, criterion: EvaluationCriterion) -> Score {
        match criterion {
            EvaluationCriterion::Accuracy => self.accuracy,
            EvaluationCriterion::Professionalism => self.professionalism,
            EvaluationCriterion::Coherence => self.coherence,
            EvaluationCriterion::Personalization => self.personalization,
            EvaluationCriterion::Persuasiveness => self.persuasiveness,
        }
    }

    /// Scores in criterion display order.
    pub fn iter(&self) -> impl Iterator<Item = (EvaluationCriterion, Score)> + '_ {
        EvaluationCriterion::ALL
            .into_iter()
            .map(move |criterion| (criterion, self.get(criterion)))
    }
}

/// A criterion the judge left unscored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    pub criterion: EvaluationCriterion,
    pub default_applied: Score,
    /// Beginning of the judge response, for diagnosis.
    pub excerpt: String,
}

/// Scored evaluation of one letter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub scores: ScoreSet,
    /// Unrounded mean over the five criteria.
    pub average_score: f64,
    /// Average mapped onto 0-100, two decimals.
    pub percentage: f64,
    pub raw_response: String,
    pub evaluated_at: DateTime<Utc>,
    #[serde(default)]
    pub warnings: Vec<ExtractionWarning>,
    #[serde(default)]
    pub improvements: Vec<Improvement>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_criterion_order_and_labels() {
        let labels: Vec<&str> = EvaluationCriterion::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["정확성", "전문성", "논리성", "개인화", "설득력"]);
    }

    #[test]
    fn test_criterion_serializes_as_key() {
        let json = serde_json::to_string(&EvaluationCriterion::Persuasiveness).unwrap();
        assert_eq!(json, "\"persuasiveness\"");
    }

    #[test]
    fn test_score_deserialization_clamps() {
        let score: Score = serde_json::from_str("9").unwrap();
        assert_eq!(score.value(), 5);
        let score: Score = serde_json::from_str("0").unwrap();
        assert_eq!(score.value(), 1);
    }

    #[test]
    fn test_score_set_iter_in_display_order() {
        let set = ScoreSet::from_fn(|c| match c {
            EvaluationCriterion::Coherence => Score::clamped(5),
            _ => Score::DEFAULT,
        });
        let collected: Vec<(EvaluationCriterion, u8)> =
            set.iter().map(|(c, s)| (c, s.value())).collect();
        assert_eq!(collected[2], (EvaluationCriterion::Coherence, 5));
        assert_eq!(collected.len(), 5);
    }

    proptest! {
        #[test]
        fn prop_clamp_law(value in any::<i64>()) {
            let expected = value.clamp(1, 5) as u8;
            prop_assert_eq!(Score::clamped(value).value(), expected);
        }
    }
}
