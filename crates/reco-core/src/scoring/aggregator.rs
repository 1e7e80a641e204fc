use serde::{Deserialize, Serialize};

use super::{Score, ScoreSet};

/// Summary numbers for a [`ScoreSet`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub average_score: f64,
    pub percentage: f64,
}

/// Mean score and its 0-100 percentage (`1 → 0`, `5 → 100`), two decimals.
pub fn aggregate(scores: &ScoreSet) -> Aggregate {
    let total: u32 = scores.iter().map(|(_, s)| u32::from(s.value())).sum();
    let average_score = f64::from(total) / 5.0;

    Aggregate {
        average_score,
        percentage: to_percentage(average_score),
    }
}

pub(crate) fn to_percentage(average_score: f64) -> f64 {
    let min = f64::from(Score::MIN);
    let span = f64::from(Score::MAX - Score::MIN);
    round2((average_score - min) / span * 100.0)
}

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
