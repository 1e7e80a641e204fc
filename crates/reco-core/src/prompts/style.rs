use super::ComposedPrompt;

/// Writing samples longer than this are cut before analysis.
pub const STYLE_SAMPLE_MAX_CHARS: usize = 5000;

/// Compose the closing-phrase analysis prompt for a writing sample.
///
/// The answer is expected as JSON and parsed by
/// [`parse_style_profile`](crate::style::parse_style_profile).
pub fn compose_style_analysis(sample: &str) -> ComposedPrompt {
    let sample = truncate_chars(sample, STYLE_SAMPLE_MAX_CHARS);

    let body = format!(
        "다음 텍스트를 분석하여 작성자의 문체 특징을 파악해주세요.\n\
         특히 **문장 끝맺음 표현**에 집중해주세요.\n\
         \n텍스트:\n\
         \"\"\"\n{sample}\n\"\"\"\n\
         \n다음 형식의 JSON으로만 응답해주세요:\n\
         {{\n\
         \x20 \"tone\": \"어조 (예: 친근한, 격식있는, 권위적인, 캐주얼한 등)\",\n\
         \x20 \"sentence_length\": \"문장 길이 (짧음/보통/김)\",\n\
         \x20 \"vocabulary_level\": \"어휘 수준 (일상적/학술적/전문적)\",\n\
         \x20 \"common_phrases\": [\"자주 사용하는 끝맺음 표현 3-5개 (예: ~하더라고요, ~네요, ~합니다 등)\"],\n\
         \x20 \"characteristics\": [\"기타 특징 2-3개\"]\n\
         }}\n\
         \n**중요**: common_phrases는 실제로 텍스트에서 발견된 구체적인 끝맺음 표현을 \
         자주 쓰이는 순서대로 포함해야 합니다."
    );

    ComposedPrompt::new(None, body)
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_sample_kept_whole() {
        let prompt = compose_style_analysis("그렇더라고요. 좋았네요.");
        assert!(prompt.body().contains("\"\"\"\n그렇더라고요. 좋았네요.\n\"\"\""));
        assert!(prompt.body().contains("\"common_phrases\""));
    }

    #[test]
    fn test_long_sample_truncated_on_char_boundary() {
        let sample = "가".repeat(STYLE_SAMPLE_MAX_CHARS + 10);
        let prompt = compose_style_analysis(&sample);
        let kept = "가".repeat(STYLE_SAMPLE_MAX_CHARS);
        assert!(prompt.body().contains(&format!("\"\"\"\n{kept}\n\"\"\"")));
    }

    #[test]
    fn test_truncate_chars_exact_length() {
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abcd", 3), "abc");
    }
}
