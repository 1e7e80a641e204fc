use serde::{Deserialize, Serialize};

use super::{EvaluationCriterion, Score, ScoreSet};

/// Letters averaging at or above this get no improvement notes.
pub const IMPROVEMENT_THRESHOLD: f64 = 4.75;

/// A concrete improvement note for one weak criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Improvement {
    pub criterion: EvaluationCriterion,
    pub score: Score,
    /// The judge's own reason, when it gave one.
    pub reason: String,
    pub suggestion: String,
}

fn suggestion(criterion: EvaluationCriterion) -> &'static str {
    match criterion {
        EvaluationCriterion::Accuracy => {
            "구체적인 사실과 데이터를 추가하고, 검증 가능한 정보를 포함하세요."
        }
        EvaluationCriterion::Professionalism => {
            "문법을 재확인하고, 전문적인 어투를 일관되게 사용하세요."
        }
        EvaluationCriterion::Coherence => {
            "도입-전개-결론 구조를 명확히 하고, 문단 간 연결을 강화하세요."
        }
        EvaluationCriterion::Personalization => {
            "지원자의 고유한 사례와 구체적인 성과(수치, 날짜)를 추가하세요."
        }
        EvaluationCriterion::Persuasiveness => {
            "명확한 추천 의사를 표현하고, 인상적인 사례로 강조하세요."
        }
    }
}

/// Improvement notes for every criterion below 5, lowest score first.
///
/// Empty when `average_score` reaches [`IMPROVEMENT_THRESHOLD`].
pub fn advise(scores: &ScoreSet, average_score: f64, raw_response: &str) -> Vec<Improvement> {
    if average_score >= IMPROVEMENT_THRESHOLD {
        return Vec::new();
    }

    let mut weak: Vec<(EvaluationCriterion, Score)> = scores
        .iter()
        .filter(|(_, score)| score.value() < Score::MAX)
        .collect();
    // Stable: ties keep criterion order
    weak.sort_by_key(|(_, score)| *score);

    weak.into_iter()
        .map(|(criterion, score)| Improvement {
            criterion,
            score,
            reason: judge_reason(criterion, raw_response)
                .unwrap_or_else(|| format!("현재 {score}점입니다")),
            suggestion: suggestion(criterion).to_string(),
        })
        .collect()
}

/// Text after the first `-` on the first line naming the criterion.
fn judge_reason(criterion: EvaluationCriterion, raw_response: &str) -> Option<String> {
    let line = raw_response.lines().find(|line| {
        line.contains(criterion.label()) || line.to_lowercase().contains(criterion.key())
    })?;
    let (_, reason) = line.split_once('-')?;
    let reason = reason.trim();
    (!reason.is_empty()).then(|| reason.to_string())
}
