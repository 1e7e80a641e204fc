//! Prompt composition.
//!
//! Every composer is a pure function of its inputs:
//! 1. [`compose_generation`] - full letter-writing instruction
//! 2. [`compose_rubric`] - five-criterion judge prompt
//! 3. [`compose_refine`] - edit pass over a user-modified letter
//! 4. [`compose_style_analysis`] - closing-phrase extraction from a writing sample

mod generation;
mod refine;
mod rubric;
mod style;

pub use generation::{compose_generation, IntensityBand, INTENSITY_BANDS};
pub use refine::compose_refine;
pub use rubric::{compose_rubric, EVALUATOR_SYSTEM_PROMPT};
pub use style::{compose_style_analysis, STYLE_SAMPLE_MAX_CHARS};

use serde::Serialize;
use std::fmt;

/// A finished prompt, ready to hand to a provider.
///
/// Immutable once composed; the body is only readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedPrompt {
    system: Option<&'static str>,
    body: String,
}

impl ComposedPrompt {
    pub(crate) fn new(system: Option<&'static str>, body: String) -> Self {
        Self { system, body }
    }

    /// Optional system preamble.
    pub fn system(&self) -> Option<&str> {
        self.system
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }
}

impl fmt::Display for ComposedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(system) = self.system {
            writeln!(f, "{system}")?;
            writeln!(f)?;
        }
        f.write_str(&self.body)
    }
}
