use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::aggregator::round2;
use super::{EvaluationCriterion, EvaluationResult};

/// Averages over a batch of evaluations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub count: usize,
    /// Mean score per criterion, two decimals.
    pub criterion_averages: BTreeMap<EvaluationCriterion, f64>,
    pub average_percentage: f64,
}

impl EvaluationSummary {
    /// Summarize a batch. `None` for an empty batch.
    pub fn from_results(results: &[EvaluationResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }
        let count = results.len();
        let n = count as f64;

        let criterion_averages = EvaluationCriterion::ALL
            .into_iter()
            .map(|criterion| {
                let total: f64 = results
                    .iter()
                    .map(|r| f64::from(r.scores.get(criterion).value()))
                    .sum();
                (criterion, round2(total / n))
            })
            .collect();

        let average_percentage = round2(results.iter().map(|r| r.percentage).sum::<f64>() / n);

        Some(Self {
            count,
            criterion_averages,
            average_percentage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score_response;
    use chrono::Utc;

    #[test]
    fn test_empty_batch_has_no_summary() {
        assert!(EvaluationSummary::from_results(&[]).is_none());
    }

    #[test]
    fn test_summary_averages() {
        let a = score_response("정확성: 5\n전문성: 5\n논리성: 5\n개인화: 5\n설득력: 5", Utc::now());
        let b = score_response("정확성: 2\n전문성: 3\n논리성: 4\n개인화: 1\n설득력: 3", Utc::now());

        let summary = EvaluationSummary::from_results(&[a, b]).unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.criterion_averages[&EvaluationCriterion::Accuracy], 3.5);
        assert_eq!(summary.criterion_averages[&EvaluationCriterion::Personalization], 3.0);
        // 100.0 and 40.0
        assert_eq!(summary.average_percentage, 70.0);
    }
}
