use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use crate::dom::walk::BlockTags;

/// Sentence-ending characters used by default: ASCII plus CJK fullwidth.
const DEFAULT_TERMINATORS: &[char] = &['.', '?', '!', '。', '？', '！'];

/// Tuning knobs for context extraction.
///
/// `boundary_tags` decides which elements count as block boundaries that no
/// sentence scan may cross; `terminators` decides where sentences end;
/// `prev_count`/`next_count` cap how many neighboring sentences are
/// collected on each side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOptions {
    pub boundary_tags: BlockTags,
    pub terminators: BTreeSet<char>,
    pub prev_count: usize,
    pub next_count: usize,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            boundary_tags: BlockTags::default(),
            terminators: DEFAULT_TERMINATORS.iter().copied().collect(),
            prev_count: 2,
            next_count: 2,
        }
    }
}

impl ExtractionOptions {
    pub(crate) fn is_terminator(&self, ch: char) -> bool {
        self.terminators.contains(&ch)
    }
}
