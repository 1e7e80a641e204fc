//! Personal writing style and the closing-phrase constraint derived from it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::CoreError;

/// Number of closing phrases a style constraint pins the letter to.
pub const CLOSING_PHRASE_COUNT: usize = 3;

/// Writing style extracted from a sample of the recommender's own text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StyleProfile {
    pub tone: String,
    pub sentence_length: String,
    pub vocabulary_level: String,

    /// Sentence endings in priority order.
    #[serde(rename = "common_phrases", alias = "closing_phrases")]
    pub closing_phrases: Vec<String>,

    pub characteristics: BTreeSet<String>,
}

impl StyleProfile {
    /// Profile that only carries closing phrases.
    pub fn with_closing_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            closing_phrases: phrases.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// How sentences in the generated letter must end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "endings", rename_all = "snake_case")]
pub enum ClosingConstraint {
    /// Standard declarative endings, no elevated honorifics.
    PlainDeclarative,
    /// Every sentence ends with one of exactly these phrases.
    FixedEndings([String; CLOSING_PHRASE_COUNT]),
}

/// Derive the closing constraint for an optional style profile.
///
/// Takes the first three usable phrases, padding with the last one found.
/// Phrases that are empty once placeholder tildes are removed are skipped.
pub fn inject(profile: Option<&StyleProfile>) -> ClosingConstraint {
    let Some(profile) = profile else {
        return ClosingConstraint::PlainDeclarative;
    };

    let usable: Vec<String> = profile
        .closing_phrases
        .iter()
        .map(|p| normalize_phrase(p))
        .filter(|p| !p.is_empty())
        .take(CLOSING_PHRASE_COUNT)
        .collect();

    let Some(last) = usable.last().cloned() else {
        return ClosingConstraint::PlainDeclarative;
    };

    let pick = |i: usize| usable.get(i).cloned().unwrap_or_else(|| last.clone());
    ClosingConstraint::FixedEndings([pick(0), pick(1), pick(2)])
}

fn normalize_phrase(phrase: &str) -> String {
    phrase
        .chars()
        .filter(|c| !matches!(c, '~' | '～'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Parse a style-analysis answer into a [`StyleProfile`].
///
/// Accepts bare JSON or JSON wrapped in a markdown code fence.
pub fn parse_style_profile(response: &str) -> Result<StyleProfile, CoreError> {
    serde_json::from_str(strip_json_fences(response))
        .map_err(|e| CoreError::StyleAnalysis(e.to_string()))
}

fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));

    match inner {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped
                .strip_suffix("```")
                .map(str::trim)
                .unwrap_or(stripped)
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(a: &str, b: &str, c: &str) -> ClosingConstraint {
        ClosingConstraint::FixedEndings([a.to_string(), b.to_string(), c.to_string()])
    }

    #[test]
    fn test_no_profile_is_plain_declarative() {
        assert_eq!(inject(None), ClosingConstraint::PlainDeclarative);
    }

    #[test]
    fn test_three_phrases_taken_in_order() {
        let profile = StyleProfile::with_closing_phrases(["~거든요", "~네요", "~더라고요", "~죠"]);
        assert_eq!(inject(Some(&profile)), fixed("거든요", "네요", "더라고요"));
    }

    #[test]
    fn test_short_list_padded_with_last_phrase() {
        let profile = StyleProfile::with_closing_phrases(["~거든요"]);
        assert_eq!(inject(Some(&profile)), fixed("거든요", "거든요", "거든요"));

        let profile = StyleProfile::with_closing_phrases(["~거든요", "네요"]);
        assert_eq!(inject(Some(&profile)), fixed("거든요", "네요", "네요"));
    }

    #[test]
    fn test_empty_phrase_list_is_plain_declarative() {
        let profile = StyleProfile::with_closing_phrases(Vec::<String>::new());
        assert_eq!(inject(Some(&profile)), ClosingConstraint::PlainDeclarative);

        let profile = StyleProfile::with_closing_phrases(["~", " ～ "]);
        assert_eq!(inject(Some(&profile)), ClosingConstraint::PlainDeclarative);
    }

    #[test]
    fn test_parse_fenced_profile() {
        let response = "```json\n{\n  \"tone\": \"친근한\",\n  \"sentence_length\": \"보통\",\n  \"vocabulary_level\": \"일상적\",\n  \"common_phrases\": [\"~하더라고요\", \"~네요\"],\n  \"characteristics\": [\"구어체\", \"구어체\", \"감탄사\"]\n}\n```";
        let profile = parse_style_profile(response).unwrap();
        assert_eq!(profile.tone, "친근한");
        assert_eq!(profile.closing_phrases, vec!["~하더라고요", "~네요"]);
        assert_eq!(profile.characteristics.len(), 2);
    }

    #[test]
    fn test_parse_bare_profile_with_missing_fields() {
        let profile = parse_style_profile(r#"{"common_phrases": ["~죠"]}"#).unwrap();
        assert_eq!(profile.closing_phrases, vec!["~죠"]);
        assert!(profile.tone.is_empty());
    }

    #[test]
    fn test_parse_garbage_is_style_analysis_error() {
        let err = parse_style_profile("I could not analyze this text.").unwrap_err();
        assert!(matches!(err, CoreError::StyleAnalysis(_)));
    }
}
