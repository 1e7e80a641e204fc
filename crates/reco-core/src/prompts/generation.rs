use chrono::NaiveDate;
use std::fmt::Write;

use super::ComposedPrompt;
use crate::length::{plan, LengthPlan};
use crate::request::{DetailSections, GenerationRequest, Intensity};
use crate::style::{inject, ClosingConstraint};
use crate::tone::{ToneCatalog, ToneDescriptor};
use crate::CoreError;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

const PLAIN_DECLARATIVE_RULE: &str =
    "- 높임 표현(~하셨습니다, ~하십니다 등) 사용을 지양하고, 평서문 형태(~했습니다, ~합니다 등)로 작성합니다.";

/// One row of the recommendation-strength table.
#[derive(Debug)]
pub struct IntensityBand {
    pub level: u8,
    pub label: &'static str,
    pub balance: &'static str,
    pub closing: &'static str,
}

/// Fixed recommendation-strength bands, indexed by `intensity - 1`.
pub static INTENSITY_BANDS: [IntensityBand; 5] = [
    IntensityBand {
        level: 1,
        label: "매우 약하게 추천",
        balance: "사실 나열만 포함하고 주관적 평가는 최소화합니다.",
        closing: "마지막 문단은 \"추천합니다\" 정도로 마무리합니다.",
    },
    IntensityBand {
        level: 2,
        label: "약하게 추천",
        balance: "사실 중심으로 서술하되 일부 평가를 포함합니다.",
        closing: "마지막 문단은 \"추천합니다\" 정도로 마무리합니다.",
    },
    IntensityBand {
        level: 3,
        label: "추천함",
        balance: "사실과 평가를 균형 있게 포함합니다.",
        closing: "마지막 문단은 \"추천합니다\" 정도로 표현합니다.",
    },
    IntensityBand {
        level: 4,
        label: "강력히 추천",
        balance: "평가와 주관적 의견을 적극적으로 포함합니다.",
        closing: "마지막 문단은 \"강력히 추천\" 또는 \"적극 추천\"으로 표현합니다.",
    },
    IntensityBand {
        level: 5,
        label: "최우선 추천",
        balance: "주관적 평가와 의견을 충분히 포함하고 확신을 드러냅니다.",
        closing: "마지막 문단은 \"강력히 추천\"과 함께 \"이러한 능력을 갖췄으므로 인재로 적합하다\"와 같은 명시적 적합성 판단을 사용합니다.",
    },
];

impl IntensityBand {
    pub fn for_intensity(intensity: Intensity) -> &'static IntensityBand {
        // Intensity is always within 1..=5
        &INTENSITY_BANDS[usize::from(intensity.value() - 1)]
    }
}

/// Compose the letter-generation instruction for a request.
///
/// `written_on` is the date printed in the letter's date line.
pub fn compose_generation(
    request: &GenerationRequest,
    written_on: NaiveDate,
) -> Result<ComposedPrompt, CoreError> {
    request.validate()?;

    let length = plan(request.target_length);
    let closing = inject(request.style_profile.as_ref());
    let tone = ToneCatalog::describe(request.tone);

    let mut body = String::new();
    write_style_preamble(&mut body, request, &closing);
    write_task(&mut body, &closing);
    write_length(&mut body, &length);
    write_skeleton(&mut body, request, &length, &closing, written_on);
    write_principles(&mut body);
    write_intensity(&mut body, request.intensity);
    write_tone(&mut body, tone, &request.requester_name);
    write_request_fields(&mut body, request);
    if let Some(details) = request.details.as_ref().filter(|d| !d.is_empty()) {
        write_details(&mut body, details);
    }
    if let Some(template) = request
        .reference_template
        .as_deref()
        .filter(|t| !t.trim().is_empty())
    {
        write_reference_template(&mut body, template);
    }
    write_checklist(&mut body, &length, &closing);

    Ok(ComposedPrompt::new(None, body.trim().to_string()))
}

// `write!` into a String cannot fail, so results below are discarded.

fn write_style_preamble(out: &mut String, request: &GenerationRequest, closing: &ClosingConstraint) {
    let ClosingConstraint::FixedEndings([first, second, third]) = closing else {
        return;
    };

    let _ = write!(
        out,
        "최우선 규칙 - 반드시 준수\n\n\
         이 추천서는 {recommender}님의 고유한 말투로 작성됩니다.\n\
         일반적인 \"~합니다\", \"~입니다\" 표현은 절대 사용하지 마세요.\n\n\
         【반드시 사용해야 할 끝맺음 표현】\n\
         • {first}\n• {second}\n• {third}\n\n\
         【예시】\n\
         ❌ 틀림: \"{requester}님은 뛰어난 인재입니다\"\n\
         ✅ 정답: \"{requester}님은 뛰어난 인재{first}\"\n\n\
         ❌ 틀림: \"프로젝트를 성공적으로 완수했습니다\"\n\
         ✅ 정답: \"프로젝트를 성공적으로 완수했{second}\"\n\n\
         ❌ 틀림: \"탁월한 성과를 보여주었습니다\"\n\
         ✅ 정답: \"탁월한 성과를 보여주었{third}\"\n\n\
         본문의 모든 문장 끝은 위의 3가지 표현 중 하나로만 끝나야 합니다.\n\
         \"~합니다\", \"~입니다\", \"~했습니다\" 같은 일반 격식체는 절대 사용 금지입니다.\n\n\
         {RULE}\n\n",
        recommender = request.recommender_name,
        requester = request.requester_name,
    );
}

fn write_task(out: &mut String, closing: &ClosingConstraint) {
    out.push_str(
        "당신은 전문 추천서 작성자입니다. 아래 입력값을 바탕으로 \"공식 추천서\"를 작성합니다.\n\
         출력은 한국어만 사용합니다. 고유명사 외 영문 표현 금지.\n",
    );
    if *closing == ClosingConstraint::PlainDeclarative {
        out.push_str(PLAIN_DECLARATIVE_RULE);
        out.push('\n');
    }
    out.push_str(
        "\n[작성 목적]\n\
         - 요청자의 역량·성과·적합성을 명확히 전달하는 추천서를 생성합니다.\n",
    );
}

fn write_length(out: &mut String, length: &LengthPlan) {
    let _ = write!(
        out,
        "\n{RULE}\n\
         [본문 길이 규칙 - 반드시 준수]\n\
         {RULE}\n\
         1. 본문 전체: 정확히 {total}자 (공백 포함)\n\
         2. 문단 수: 약 {paragraphs}개 문단 작성\n\
         3. 각 문단 길이: 평균 {per}자 정도\n\
         4. 요청된 {total}자를 정확히 맞추는 것이 최우선입니다.\n\
         5. 예시, 수치, 구체적 상황을 포함하되 전체 길이를 준수하세요.\n\
         {RULE}\n",
        total = length.target_total_chars,
        paragraphs = length.paragraph_count,
        per = length.chars_per_paragraph,
    );
}

fn write_skeleton(
    out: &mut String,
    request: &GenerationRequest,
    length: &LengthPlan,
    closing: &ClosingConstraint,
    written_on: NaiveDate,
) {
    let ending_note = match closing {
        ClosingConstraint::FixedEndings(_) => " - 모든 문장 끝은 위에서 지정한 끝맺음 표현만 사용",
        ClosingConstraint::PlainDeclarative => "",
    };

    let _ = write!(
        out,
        "\n[형식]\n\
         1) 제목: 추천서\n\
         2) 빈 줄\n\
         3) 본문 (약 {paragraphs}개 문단, 각 문단 평균 {per}자){ending_note}\n\
         \x20  - 작성자 소개와 관계\n\
         \x20  - 첫 인상과 전반적 역량 평가\n\
         \x20  - 구체적 성과 사례 (상세히)\n\
         \x20  - 협업 및 커뮤니케이션 능력\n\
         \x20  - 문제 해결 능력과 창의성\n\
         \x20  - 성장 과정과 학습 태도\n\
         \x20  - 종합 평가 및 추천\n\
         4) 빈 줄 2개\n\
         5) 작성 날짜: \"{date}\"\n\
         6) 빈 줄 1개\n\
         7) 작성자 정보\n\
         \x20  - 작성자: {recommender}\n\
         \x20  - 소속/직위: (관계 정보에서 자연스럽게 추출)\n\
         \x20  - 연락처: {contact}\n\
         \x20  - 서명:\n\
         \n[형식 규칙]\n\
         - 대괄호(예: [도입], [마무리])나 섹션 번호를 본문에 사용하지 않습니다.\n\
         - 'To whom it may concern', 'Sincerely' 같은 영문 인사말 금지.\n\
         - 이름/이메일은 그대로 유지합니다(변형 금지).\n\
         - 각 문단 사이에 빈 줄 하나를 넣습니다.\n",
        paragraphs = length.paragraph_count,
        per = length.chars_per_paragraph,
        date = written_on.format("%Y년 %m월 %d일"),
        recommender = request.recommender_name,
        contact = request.recommender_email.as_deref().unwrap_or(""),
    );
}

fn write_principles(out: &mut String) {
    out.push_str(
        "\n[내용 원칙]\n\
         - 사실성: 제공된 입력·상세정보만 사용하고, 새로운 사실을 창작하지 않습니다(환각 금지).\n\
         - 구체성: 추상적 평가어보다 지표·결과·행동·맥락을 함께 제시합니다.\n\
         - 응집성: 문단 간 논리 연결어(예: 무엇보다, 특히, 또한, 따라서)를 적절히 배치합니다.\n\
         - 포용성: 과장/차별/비하/정치적 발언 금지. 비공개 정보·민감 정보는 드러내지 않습니다.\n\
         - 나열체 금지: 상세 정보가 주어지면 문장 흐름 속에 자연스럽게 녹입니다.\n",
    );
}

fn write_intensity(out: &mut String, intensity: Intensity) {
    out.push_str("\n[추천 강도 기준]\n");
    for band in &INTENSITY_BANDS {
        let _ = writeln!(
            out,
            "- {}점({}): {} {}",
            band.level, band.label, band.balance, band.closing
        );
    }

    let selected = IntensityBand::for_intensity(intensity);
    let _ = write!(
        out,
        "- 선택된 강도: {}점({}). 이 기준에 맞게 본문의 평가 비중과 마지막 문단의 추천 어조를 조절하세요.\n",
        selected.level, selected.label
    );
}

fn write_tone(out: &mut String, tone: &ToneDescriptor, requester: &str) {
    let _ = write!(
        out,
        "\n[{label} 톤]\n\
         - 문체: {register}\n\
         - 사용 권장: {recommended}\n\
         - 평가 표현: {evaluative}\n\
         - 금지 어휘: {forbidden}\n\
         - 문장 구조: {structure}\n\
         - 표현 방식: {expression}\n\
         - 예시: \"{example}\"\n\
         - 위 특징을 엄격히 준수하고, 예시 문장은 참고만 하며 그대로 사용하지 마세요.\n",
        label = tone.label,
        register = tone.register,
        recommended = quoted_list(tone.recommended),
        evaluative = quoted_list(tone.evaluative),
        forbidden = quoted_list(tone.forbidden),
        structure = tone.sentence_structure,
        expression = tone.expression,
        example = tone.example_for(requester),
    );
}

fn quoted_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("\"{item}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_request_fields(out: &mut String, request: &GenerationRequest) {
    let field = |value: &Option<String>| value.clone().unwrap_or_default();

    let _ = write!(
        out,
        "\n[입력] (이름과 이메일은 변형하지 말고 그대로 사용)\n\
         - 추천 강도: {intensity}점\n\
         - 추천서 톤: {tone}\n\
         - 작성자: {recommender}\n\
         - 요청자: {requester} / {email}\n\
         - 전공 분야: {major}\n\
         - 관계: {relationship}\n\
         - 장점: {strengths}\n\
         - 기억에 남는 사례: {memorable}\n\
         - 추가 내용: {additional}\n",
        intensity = request.intensity,
        tone = ToneCatalog::describe(request.tone).label,
        recommender = request.recommender_name,
        requester = request.requester_name,
        email = request.requester_email,
        major = field(&request.major_field),
        relationship = field(&request.relationship),
        strengths = field(&request.strengths),
        memorable = field(&request.memorable),
        additional = field(&request.additional_info),
    );
}

fn write_details(out: &mut String, details: &DetailSections) {
    out.push_str(
        "\n[요청자 상세 정보]\n\
         아래 정보를 본문에 자연스럽게 녹여 기술합니다. 표제·대괄호를 본문에 그대로 노출하지 마십시오.\n",
    );

    write_section(out, "경력 사항", details.experiences.iter().map(ToString::to_string));
    write_section(out, "수상 이력", details.awards.iter().map(ToString::to_string));
    write_section(out, "자격증", details.certifications.iter().map(ToString::to_string));
    write_section(out, "강점", details.strengths.iter().map(ToString::to_string));
    write_section(out, "프로젝트", details.projects.iter().map(ToString::to_string));
}

fn write_section(out: &mut String, title: &str, lines: impl Iterator<Item = String>) {
    let mut lines = lines.peekable();
    if lines.peek().is_none() {
        return;
    }
    let _ = writeln!(out, "<{title}>");
    for line in lines {
        let _ = writeln!(out, "- {line}");
    }
}

fn write_reference_template(out: &mut String, template: &str) {
    let _ = write!(
        out,
        "\n[참고 양식]\n\
         아래 예시는 구조·톤·표현 방식만 참고하고, 내용은 절대 복사하지 않습니다.\n\
         {RULE}\n\
         {template}\n\
         {RULE}\n\
         내용은 입력된 정보를 바탕으로 완전히 새롭게 작성하세요.\n",
        template = template.trim(),
    );
}

fn write_checklist(out: &mut String, length: &LengthPlan, closing: &ClosingConstraint) {
    let _ = write!(
        out,
        "\n[점검사항]\n\
         - 본문이 최소 {total}자 이상인가?\n\
         - 본문이 약 {paragraphs}개 문단으로 구성되었는가?\n\
         - 제목, 본문, 작성 날짜, 작성자 정보 순서를 지켰는가?\n\
         - 구체적 사례가 포함되었는가?\n",
        total = length.target_total_chars,
        paragraphs = length.paragraph_count,
    );
    if let ClosingConstraint::FixedEndings(_) = closing {
        out.push_str("- 모든 문장이 지정된 끝맺음 표현으로 끝나는가?\n");
    }
}
