use super::ComposedPrompt;
use crate::tone::{Tone, ToneCatalog};

/// Compose an edit pass over a letter the user has already modified.
///
/// The current text wins over the improvement notes; facts, names, dates and
/// figures present in it are never altered or extended.
pub fn compose_refine(current_content: &str, improvement_notes: &str, tone: Tone) -> ComposedPrompt {
    let tone_label = ToneCatalog::describe(tone).label;
    let notes = match improvement_notes.trim() {
        "" => "(별도 요청 없음 - 최소 변경으로 다듬기만 합니다)",
        notes => notes,
    };

    let body = format!(
        "당신은 전문 추천서 개선 작성자입니다.\n\
         사용자가 직접 작성/수정한 추천서와 개선 요청사항을 받았습니다.\n\
         목표는 사용자의 현재 문서를 최대한 보존하면서, 요청된 개선점만 정밀 반영한 최종본을 만드는 것입니다.\n\
         출력은 한국어만 사용합니다. 고유명사 외 영문 표현 금지.\n\
         \n[현재 추천서(사용자 수정본)]\n\
         {current}\n\
         \n[개선 요청사항]\n\
         {notes}\n\
         \n[최우선 원칙]\n\
         1) 현재 추천서의 내용·문장·표현을 최대한 보존합니다.\n\
         2) 사용자가 기입한 이름/날짜/수치/사실은 절대 변경하지 않습니다.\n\
         3) 개선 요청사항과 충돌하면 현재 문서를 우선하고, 모호하면 최소 변경 원칙을 따릅니다.\n\
         \n[개선 범위(요청사항에 해당할 때만 수행)]\n\
         - 구조: 문단 재배열, 연결어 보완으로 흐름 개선\n\
         - 명료성: 중복 축약, 장문 분할, 모호한 표현 구체화\n\
         - 어조: {tone_label} 톤에 맞게 일관성 정렬\n\
         - 형식: 제목, 본문, 날짜, 작성자 정보 순서 유지\n\
         \n[금지]\n\
         - 새로운 사실 창작/추가 금지(환각 금지)\n\
         - 영문 인사말/섹션명/번호 목록 사용 금지\n\
         \n[최종 출력 방식]\n\
         - 변경 이력 없이 완성된 추천서만 출력합니다.\n\
         - 제목/본문/날짜/작성자 정보를 모두 포함합니다.",
        current = current_content.trim(),
    );

    ComposedPrompt::new(None, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refine_embeds_letter_and_notes() {
        let prompt = compose_refine("추천서\n\n본문입니다.", "둘째 문단을 더 구체적으로", Tone::Friendly);
        let body = prompt.body();
        assert!(body.contains("[현재 추천서(사용자 수정본)]\n추천서\n\n본문입니다.\n"));
        assert!(body.contains("[개선 요청사항]\n둘째 문단을 더 구체적으로\n"));
        assert!(body.contains("친근한 톤"));
        assert!(body.contains("환각 금지"));
    }

    #[test]
    fn test_refine_blank_notes_means_minimal_change() {
        let prompt = compose_refine("본문", "   ", Tone::Formal);
        assert!(prompt.body().contains("최소 변경으로 다듬기만"));
    }
}
