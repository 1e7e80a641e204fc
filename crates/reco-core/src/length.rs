//! Length planning: target character count → paragraph layout.

use serde::{Deserialize, Serialize};

/// Body length used when the request does not specify one.
pub const DEFAULT_TARGET_CHARS: u32 = 1000;

/// Average paragraph size the planner aims for.
pub const AVERAGE_CHARS_PER_PARAGRAPH: u32 = 400;

/// A letter never has fewer paragraphs than this.
pub const MIN_PARAGRAPHS: u32 = 3;

/// Paragraph layout for one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthPlan {
    pub target_total_chars: u32,
    pub paragraph_count: u32,
    pub chars_per_paragraph: u32,
}

/// Plan the paragraph layout for a target body length.
///
/// `None` plans for [`DEFAULT_TARGET_CHARS`]. Division floors:
/// 1000 chars → 3 paragraphs of 333, 2000 chars → 5 paragraphs of 400.
pub fn plan(target_total_chars: Option<u32>) -> LengthPlan {
    let target_total_chars = target_total_chars.unwrap_or(DEFAULT_TARGET_CHARS);
    let paragraph_count = (target_total_chars / AVERAGE_CHARS_PER_PARAGRAPH).max(MIN_PARAGRAPHS);

    LengthPlan {
        target_total_chars,
        paragraph_count,
        chars_per_paragraph: target_total_chars / paragraph_count,
    }
}
