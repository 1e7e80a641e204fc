use std::fmt::Write;

use super::ComposedPrompt;
use crate::scoring::EvaluationCriterion;

/// System preamble for the judge model.
pub const EVALUATOR_SYSTEM_PROMPT: &str = "당신은 추천서 품질을 평가하는 전문가입니다.";

const STRICTNESS: &str = "\
평가 시 다음 원칙을 반드시 지켜주세요:
- 5점은 \"거의 완벽한 수준\"에만 부여 (상위 5% 이내)
- 4점은 \"매우 우수한 수준\"에만 부여 (상위 20% 이내)
- 3점은 \"평균적인 수준\"
- 2점 이하는 \"개선이 필요한 수준\"
- 사소한 문제나 부족한 점이 있으면 반드시 감점";

/// Band descriptions for scores 5 down to 1.
fn bands(criterion: EvaluationCriterion) -> [&'static str; 5] {
    match criterion {
        EvaluationCriterion::Accuracy => [
            "모든 내용이 검증 가능하고, 과장이나 추상적 표현이 전혀 없음",
            "대부분 사실 기반이나 일부 검증하기 어려운 표현이 있음",
            "사실과 추상적 표현이 혼재",
            "과장된 표현이나 검증 불가능한 내용이 다수 포함",
            "허위 정보나 명백한 과장이 있음",
        ],
        EvaluationCriterion::Professionalism => [
            "문법·맞춤법 완벽, 전문적 어투 일관성 유지, 세련된 문장",
            "문법 정확하나 일부 문장이 어색하거나 단조로움",
            "기본적인 문법은 맞으나 전문성이 부족하거나 띄어쓰기 오류 있음",
            "문법 오류가 여러 개 있거나 비전문적인 표현 사용",
            "심각한 문법 오류 또는 구어체 사용",
        ],
        EvaluationCriterion::Coherence => [
            "도입→사례→결론 흐름이 완벽하고, 모든 문단이 긴밀하게 연결됨",
            "전체 구조는 갖췄으나 일부 문단 연결이 매끄럽지 않음",
            "기본 구조는 있으나 논리적 비약이나 갑작스러운 전개가 있음",
            "구조가 불명확하거나 논리적 흐름이 부족함",
            "구조가 없고 내용이 산만함",
        ],
        EvaluationCriterion::Personalization => [
            "지원자만의 고유한 사례와 구체적 성과가 다수 포함, 숫자/날짜 등 구체적 정보",
            "구체적 사례가 있으나 일부 일반적인 표현도 섞여 있음",
            "일반적 칭찬과 구체적 사례가 반반 정도",
            "대부분 \"성실하다\", \"책임감 있다\" 등 일반적 표현 위주",
            "템플릿형 내용, 누구에게나 적용 가능한 내용",
        ],
        EvaluationCriterion::Persuasiveness => [
            "명확한 추천 의사 + 구체적 근거 + 인상적인 사례 + 효과적 강조",
            "추천 의사와 근거는 있으나 임팩트가 다소 부족",
            "추천 의사는 있으나 근거가 약하거나 설득력이 보통 수준",
            "추천 의사가 명확하지 않거나 근거가 매우 빈약함",
            "추천 의사가 불분명하고 설득력이 없음",
        ],
    }
}

/// Compose the five-criterion judge prompt for a finished letter.
pub fn compose_rubric(document_text: &str) -> ComposedPrompt {
    let mut body = String::from(
        "다음 추천서를 5가지 기준으로 **매우 엄격하게** 평가해주세요.\n",
    );
    body.push_str(STRICTNESS);

    let _ = write!(body, "\n\n추천서 텍스트:\n\"\"\"{document_text}\"\"\"\n\n평가 기준 (엄격하게 적용):\n");

    for (index, criterion) in EvaluationCriterion::ALL.into_iter().enumerate() {
        let _ = writeln!(
            body,
            "\n{}. {} ({}):",
            index + 1,
            criterion.rubric_heading(),
            criterion.english_name()
        );
        for (offset, band) in bands(criterion).iter().enumerate() {
            let _ = writeln!(body, "   - {}점: {band}", 5 - offset);
        }
    }

    body.push_str("\n응답 형식 (반드시 아래 형식을 정확히 따라주세요):\n");
    for criterion in EvaluationCriterion::ALL {
        let _ = writeln!(body, "{}: X점 - [한 줄 이유]", criterion.label());
    }
    body.push_str("\n주의: 각 항목을 반드시 한 줄로 작성하고, \"X점\" 형식을 꼭 지켜주세요.");

    ComposedPrompt::new(Some(EVALUATOR_SYSTEM_PROMPT), body)
}
