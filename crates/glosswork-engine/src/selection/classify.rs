use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dom::traits::DocumentRead;
use crate::dom::walk::{self, BlockTags, TextWalker};
use crate::selection::span::Span;

/// Whether a span holds a single word or a multi-word fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpanKind {
    Word,
    Fragment,
}

/// Snapshot of a span's linguistic edges.
///
/// `left_complete`/`right_complete` say whether the span already starts/ends
/// at a word boundary; the adjuster only expands spans whose edges are
/// incomplete. Derived purely from the tree at call time, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryClassification {
    pub kind: SpanKind,
    pub left_complete: bool,
    pub right_complete: bool,
    pub is_complete: bool,
    pub has_boundary_whitespace: bool,
}

impl BoundaryClassification {
    /// The degraded answer for empty or unreadable spans: a complete
    /// fragment that no caller will try to expand.
    pub(crate) fn empty() -> Self {
        Self {
            kind: SpanKind::Fragment,
            left_complete: true,
            right_complete: true,
            is_complete: true,
            has_boundary_whitespace: false,
        }
    }
}

// Combining marks and format controls (ZWNJ, ZWJ) attach to the word they
// follow; treating them as boundaries would truncate decomposed text.
static WORD_GLUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{M}\p{Cf}]").expect("word glue regex"));

/// True for characters that delimit word edges.
///
/// Whitespace, punctuation and symbols all delimit; the hyphen deliberately
/// does not, so compounds like "co-founders" stay one word. Combining marks
/// and format joiners count as part of the word that carries them.
pub fn is_boundary_char(ch: char) -> bool {
    if ch == '-' || ch.is_alphanumeric() {
        return false;
    }
    let mut buf = [0u8; 4];
    !WORD_GLUE.is_match(ch.encode_utf8(&mut buf))
}

/// Classify `span` as word/fragment and judge its edge completeness.
///
/// An edge is complete when the span itself starts (ends) with a boundary
/// character, or when the nearest character just outside the span (looked
/// up within that endpoint's closest block ancestor) is absent or a
/// boundary character.
pub fn classify<D: DocumentRead>(doc: &D, span: &Span<D::Node>) -> BoundaryClassification {
    let Some(raw) = walk::span_text(doc, span) else {
        return BoundaryClassification::empty();
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return BoundaryClassification::empty();
    }

    let kind = if trimmed.chars().any(char::is_whitespace) {
        SpanKind::Fragment
    } else {
        SpanKind::Word
    };
    let has_boundary_whitespace = raw.len() != trimmed.len();

    let left_complete = match raw.chars().next() {
        Some(first) if is_boundary_char(first) => true,
        _ => char_outside_start(doc, span).is_none_or(is_boundary_char),
    };
    let right_complete = match raw.chars().next_back() {
        Some(last) if is_boundary_char(last) => true,
        _ => char_outside_end(doc, span).is_none_or(is_boundary_char),
    };

    BoundaryClassification {
        kind,
        left_complete,
        right_complete,
        is_complete: left_complete && right_complete,
        has_boundary_whitespace,
    }
}

fn char_outside_start<D: DocumentRead>(doc: &D, span: &Span<D::Node>) -> Option<char> {
    let start = walk::resolve_start(doc, &span.start)?;
    let scope = walk::closest_block_ancestor(doc, start.node, &BlockTags::default());
    TextWalker::at(doc, scope, start)?.peek_prev()
}

fn char_outside_end<D: DocumentRead>(doc: &D, span: &Span<D::Node>) -> Option<char> {
    let end = walk::resolve_end(doc, &span.end)?;
    let scope = walk::closest_block_ancestor(doc, end.node, &BlockTags::default());
    TextWalker::at(doc, scope, end)?.peek_next()
}
