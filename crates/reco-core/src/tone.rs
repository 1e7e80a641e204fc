//! Tone catalog: maps each letter tone to vocabulary rules and an example sentence.
//!
//! The catalog is closed: four tones, fixed content. Anything else is rejected
//! with [`CoreError::UnknownTone`] at the parsing boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Placeholder replaced by the requester's name in [`ToneDescriptor::example`].
pub const REQUESTER_PLACEHOLDER: &str = "{requester}";

/// Letter tone selected by the recommender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Tone {
    Formal,
    Friendly,
    Concise,
    Persuasive,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Formal, Tone::Friendly, Tone::Concise, Tone::Persuasive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Formal => "Formal",
            Tone::Friendly => "Friendly",
            Tone::Concise => "Concise",
            Tone::Persuasive => "Persuasive",
        }
    }
}

impl Default for Tone {
    fn default() -> Self {
        Tone::Formal
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = CoreError;

    /// Accepts the English variant name (any case) or the Korean label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Tone::ALL
            .into_iter()
            .find(|tone| {
                tone.as_str().eq_ignore_ascii_case(trimmed)
                    || ToneCatalog::describe(*tone).label == trimmed
            })
            .ok_or_else(|| CoreError::UnknownTone(trimmed.to_string()))
    }
}

impl TryFrom<String> for Tone {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Vocabulary and phrasing rules for one tone.
#[derive(Debug)]
pub struct ToneDescriptor {
    pub tone: Tone,
    /// Korean label used inside prompts (e.g. "공식적").
    pub label: &'static str,
    pub register: &'static str,
    pub recommended: &'static [&'static str],
    pub evaluative: &'static [&'static str],
    pub forbidden: &'static [&'static str],
    pub sentence_structure: &'static str,
    pub expression: &'static str,
    /// Example sentence containing [`REQUESTER_PLACEHOLDER`].
    pub example: &'static str,
}

impl ToneDescriptor {
    /// The example sentence with the requester's name filled in.
    pub fn example_for(&self, requester: &str) -> String {
        self.example.replace(REQUESTER_PLACEHOLDER, requester)
    }
}

static FORMAL: ToneDescriptor = ToneDescriptor {
    tone: Tone::Formal,
    label: "공식적",
    register: "격식 있고 정중하며, 공식 문서에 적합한 문체",
    recommended: &[
        "임무를 수행했습니다",
        "역량을 발휘했습니다",
        "성과를 달성했습니다",
        "기여했습니다",
        "보여주었습니다",
        "입증했습니다",
        "검증되었습니다",
        "기대됩니다",
        "권장합니다",
    ],
    evaluative: &["탁월한", "뛰어난", "우수한", "능력 있는", "적합한", "기대되는"],
    forbidden: &["좋아요", "괜찮아요", "멋져요", "대단해요", "~했어요", "~했음"],
    sentence_structure: "주어-서술어 구조가 명확하고, 수동태 사용 가능, 복문 활용",
    expression: "객관적 사실 서술, 수치와 데이터 강조, 공식적 평가 표현",
    example: "저는 {requester}이 업무 수행 과정에서 탁월한 역량을 발휘했음을 확인했습니다.",
};

static FRIENDLY: ToneDescriptor = ToneDescriptor {
    tone: Tone::Friendly,
    label: "친근한",
    register: "편안하고 따뜻하며, 개인적 경험을 바탕으로 한 친밀한 문체",
    recommended: &[
        "함께 일했습니다",
        "지켜봤습니다",
        "느꼈습니다",
        "경험했습니다",
        "인상 깊었습니다",
        "기억에 남습니다",
        "인상적이었습니다",
        "자랑스럽습니다",
    ],
    evaluative: &["훌륭한", "멋진", "뛰어난", "좋은", "특별한", "인상적인"],
    forbidden: &["~함", "~임", "개조식 나열", "딱딱한 공문서 투"],
    sentence_structure: "주관적 경험 서술, 감정 표현 포함, 구체적 일화 활용",
    expression: "개인적 관찰과 경험 강조, 따뜻한 어조, 구체적 상황 묘사",
    example: "저는 {requester}과 함께 일하면서 정말 인상 깊었던 점이 많았습니다.",
};

static CONCISE: ToneDescriptor = ToneDescriptor {
    tone: Tone::Concise,
    label: "간결한",
    register: "핵심만 간단명료하게, 불필요한 수식어 없이 직설적",
    recommended: &[
        "했습니다",
        "완료했습니다",
        "달성했습니다",
        "보유하고 있습니다",
        "능력이 있습니다",
        "적합합니다",
        "추천합니다",
    ],
    evaluative: &["우수", "능력", "적합", "기대"],
    forbidden: &["매우", "정말", "너무나도", "특히", "무엇보다", "장황한 설명"],
    sentence_structure: "단문 위주, 주어-서술어-목적어 구조 명확, 불필요한 부사/형용사 제거",
    expression: "사실 중심, 핵심만 간결히, 직설적 표현",
    example: "저는 {requester}을 추천합니다. 업무 능력이 우수하고 적합한 인재입니다.",
};

static PERSUASIVE: ToneDescriptor = ToneDescriptor {
    tone: Tone::Persuasive,
    label: "설득형",
    register: "논리적 근거와 구체적 사례를 바탕으로 한 적극적 추천 문체",
    recommended: &[
        "입증했습니다",
        "증명했습니다",
        "강력히 추천합니다",
        "적극 추천합니다",
        "확신합니다",
        "자신합니다",
        "기대합니다",
    ],
    evaluative: &["탁월한", "뛰어난", "우수한", "최고의", "이상적인"],
    forbidden: &["~인 것 같습니다", "아마도", "어느 정도", "나쁘지 않은"],
    sentence_structure: "논리적 연결 구조, 인과관계 명시, 대조/비교 활용",
    expression: "구체적 사례와 수치 강조, 논리적 근거 제시, 적극적 추천 어조",
    example: "저는 {requester}을 강력히 추천합니다. 특히 업무 수행 과정에서 보여준 역량은 입증된 사실입니다.",
};

/// Read-only lookup over the four tone descriptors.
pub struct ToneCatalog;

impl ToneCatalog {
    /// Descriptor for a tone.
    pub fn describe(tone: Tone) -> &'static ToneDescriptor {
        match tone {
            Tone::Formal => &FORMAL,
            Tone::Friendly => &FRIENDLY,
            Tone::Concise => &CONCISE,
            Tone::Persuasive => &PERSUASIVE,
        }
    }

    /// Descriptor for a tone given by name.
    ///
    /// Fails with [`CoreError::UnknownTone`] for names outside the catalog.
    pub fn lookup(name: &str) -> Result<&'static ToneDescriptor, CoreError> {
        name.parse::<Tone>().map(Self::describe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_english_names_case_insensitive() {
        assert_eq!("formal".parse::<Tone>().unwrap(), Tone::Formal);
        assert_eq!("PERSUASIVE".parse::<Tone>().unwrap(), Tone::Persuasive);
        assert_eq!(" Concise ".parse::<Tone>().unwrap(), Tone::Concise);
    }

    #[test]
    fn test_parse_korean_label() {
        assert_eq!("친근한".parse::<Tone>().unwrap(), Tone::Friendly);
    }

    #[test]
    fn test_unknown_tone_rejected() {
        let err = ToneCatalog::lookup("Sarcastic").unwrap_err();
        assert_eq!(err, CoreError::UnknownTone("Sarcastic".to_string()));
    }

    #[test]
    fn test_tone_deserialization_uses_catalog() {
        let tone: Tone = serde_json::from_str("\"friendly\"").unwrap();
        assert_eq!(tone, Tone::Friendly);

        let err = serde_json::from_str::<Tone>("\"Casual\"").unwrap_err();
        assert!(err.to_string().contains("Unknown tone"));
    }

    #[test]
    fn test_every_tone_has_rules() {
        for tone in Tone::ALL {
            let d = ToneCatalog::describe(tone);
            assert_eq!(d.tone, tone);
            assert!(!d.recommended.is_empty());
            assert!(!d.forbidden.is_empty());
            assert!(d.example.contains(REQUESTER_PLACEHOLDER));
        }
    }

    #[test]
    fn test_concise_forbids_intensifiers() {
        let d = ToneCatalog::describe(Tone::Concise);
        assert!(d.forbidden.contains(&"매우"));
        assert!(d.forbidden.contains(&"정말"));
    }

    #[test]
    fn test_example_for_fills_requester() {
        let d = ToneCatalog::describe(Tone::Formal);
        assert!(d.example_for("김나비").starts_with("저는 김나비이"));
    }
}
