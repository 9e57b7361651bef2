//! Word, character, and reading-time counts for a draft body.

use serde::{Deserialize, Serialize};

/// Average adult reading speed used for the reading-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

/// Counts derived from the draft content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStats {
    /// Whitespace-separated tokens.
    pub word_count: usize,
    /// Unicode scalar values, whitespace included.
    pub character_count: usize,
    /// Rounded up; zero only for an empty body.
    pub reading_time_minutes: usize,
}

impl TextStats {
    pub fn from_text(text: &str) -> Self {
        let word_count = text.split_whitespace().count();
        Self {
            word_count,
            character_count: text.chars().count(),
            reading_time_minutes: word_count.div_ceil(WORDS_PER_MINUTE),
        }
    }
}
