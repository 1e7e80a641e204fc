//! Score extraction patterns.
//!
//! One ordered table of `(criterion, priority, regex)`. For each criterion the
//! lowest priority that matches wins and its first capture group is the score
//! digit. Adding a phrasing the judge uses means adding a row here, not
//! touching the extractor.

use lazy_static::lazy_static;
use regex::Regex;

use super::EvaluationCriterion;

/// A single extraction rule.
#[derive(Debug)]
pub struct ScorePattern {
    pub criterion: EvaluationCriterion,
    /// Lower is tried first.
    pub priority: u8,
    pub regex: Regex,
}

impl ScorePattern {
    fn new(criterion: EvaluationCriterion, priority: u8, pattern: &str) -> Self {
        Self {
            criterion,
            priority,
            regex: Regex::new(pattern).unwrap(),
        }
    }
}

lazy_static! {
    /// All extraction rules, sorted by criterion then priority.
    pub static ref SCORE_PATTERNS: Vec<ScorePattern> = {
        use EvaluationCriterion::*;

        let mut table = vec![
            // =================================================================
            // ACCURACY
            // =================================================================
            ScorePattern::new(Accuracy, 0, r"(?i)정확성[:\s]*\(?accuracy\)?[:\s]*([0-9])\s*점"),
            ScorePattern::new(Accuracy, 1, r"(?i)정확성[:\s]+([0-9])"),
            ScorePattern::new(Accuracy, 2, r"(?i)\baccuracy\)?\s*:\s*([0-9])"),

            // =================================================================
            // PROFESSIONALISM
            // =================================================================
            ScorePattern::new(Professionalism, 0, r"(?i)전문성[:\s]*\(?professionalism\)?[:\s]*([0-9])\s*점"),
            ScorePattern::new(Professionalism, 1, r"(?i)전문성[:\s]+([0-9])"),
            ScorePattern::new(Professionalism, 2, r"(?i)\bprofessionalism\)?\s*:\s*([0-9])"),

            // =================================================================
            // COHERENCE (the rubric heading is "논리성/구조")
            // =================================================================
            ScorePattern::new(Coherence, 0, r"(?i)논리성[/·\s]*구조?[:\s]*\(?coherence\)?[:\s]*([0-9])\s*점"),
            ScorePattern::new(Coherence, 1, r"(?i)논리성[:\s]+([0-9])"),
            ScorePattern::new(Coherence, 2, r"(?i)구조[:\s]+([0-9])"),
            ScorePattern::new(Coherence, 3, r"(?i)\bcoherence\)?\s*:\s*([0-9])"),

            // =================================================================
            // PERSONALIZATION
            // =================================================================
            ScorePattern::new(Personalization, 0, r"(?i)개인화[:\s]*\(?personalization\)?[:\s]*([0-9])\s*점"),
            ScorePattern::new(Personalization, 1, r"(?i)개인화[:\s]+([0-9])"),
            ScorePattern::new(Personalization, 2, r"(?i)\bpersonalization\)?\s*:\s*([0-9])"),

            // =================================================================
            // PERSUASIVENESS
            // =================================================================
            ScorePattern::new(Persuasiveness, 0, r"(?i)설득력[:\s]*\(?persuasiveness\)?[:\s]*([0-9])\s*점"),
            ScorePattern::new(Persuasiveness, 1, r"(?i)설득력[:\s]+([0-9])"),
            ScorePattern::new(Persuasiveness, 2, r"(?i)\bpersuasiveness\)?\s*:\s*([0-9])"),
        ];

        table.sort_by_key(|p| (p.criterion, p.priority));
        table
    };
}

/// Rules for one criterion, highest precedence first.
pub fn patterns_for(criterion: EvaluationCriterion) -> impl Iterator<Item = &'static ScorePattern> {
    SCORE_PATTERNS
        .iter()
        .filter(move |pattern| pattern.criterion == criterion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_criterion_has_patterns() {
        for criterion in EvaluationCriterion::ALL {
            assert!(patterns_for(criterion).count() >= 2, "{criterion} has too few patterns");
        }
    }

    #[test]
    fn test_priorities_ascending_within_criterion() {
        for criterion in EvaluationCriterion::ALL {
            let priorities: Vec<u8> = patterns_for(criterion).map(|p| p.priority).collect();
            assert!(priorities.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_bilingual_heading_pattern() {
        let pattern = patterns_for(EvaluationCriterion::Accuracy).next().unwrap();
        let caps = pattern.regex.captures("정확성 (Accuracy): 4점").unwrap();
        assert_eq!(&caps[1], "4");
    }

    #[test]
    fn test_coherence_slash_heading() {
        let matched = patterns_for(EvaluationCriterion::Coherence)
            .find_map(|p| p.regex.captures("논리성/구조: 2점 - 비약 있음"))
            .unwrap();
        assert_eq!(&matched[1], "2");
    }

    #[test]
    fn test_case_insensitive_english_label() {
        let matched = patterns_for(EvaluationCriterion::Persuasiveness)
            .find_map(|p| p.regex.captures("PERSUASIVENESS: 5"))
            .unwrap();
        assert_eq!(&matched[1], "5");
    }
}
