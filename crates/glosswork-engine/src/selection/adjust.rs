use std::cmp::Ordering;

use tracing::debug;

use crate::dom::traits::DocumentRead;
use crate::dom::walk::{self, BlockTags, TextWalker};
use crate::selection::classify::{self, SpanKind, is_boundary_char};
use crate::selection::span::Span;

/// Cap on characters scanned per direction during word-boundary expansion.
/// Bounds the walk on pathological trees; no natural word comes close.
pub(crate) const MAX_EXPANSION_SCAN: usize = 50;

/// Result of [`trim_boundary_whitespace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimOutcome<N> {
    pub span: Span<N>,
    pub adjusted: bool,
    pub had_leading_whitespace: bool,
    pub had_trailing_whitespace: bool,
}

/// Result of [`expand_to_word_boundaries`] and [`adjust_selection_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustOutcome<N> {
    pub span: Span<N>,
    pub adjusted: bool,
}

impl<N: Copy + PartialEq> TrimOutcome<N> {
    fn unchanged(span: Span<N>) -> Self {
        Self {
            span,
            adjusted: false,
            had_leading_whitespace: false,
            had_trailing_whitespace: false,
        }
    }
}

impl<N: Copy + PartialEq> AdjustOutcome<N> {
    fn unchanged(span: Span<N>) -> Self {
        Self {
            span,
            adjusted: false,
        }
    }
}

/// Strip whitespace (including NBSP) from both edges of `span`.
///
/// The start locator advances over whitespace characters, hopping to the
/// next text node inside the span's common-ancestor scope when one runs out;
/// the end locator mirrors backward. A whitespace-only span collapses at the
/// trimmed position. `adjusted` is also set when the span's text merely
/// contains collapsible whitespace runs, so callers can tell "already clean"
/// from "cleaned".
pub fn trim_boundary_whitespace<D: DocumentRead>(
    doc: &D,
    span: &Span<D::Node>,
) -> TrimOutcome<D::Node> {
    if span.is_collapsed() {
        return TrimOutcome::unchanged(*span);
    }
    let (Some(start), Some(end)) = (
        walk::resolve_start(doc, &span.start),
        walk::resolve_end(doc, &span.end),
    ) else {
        debug!("trim: unresolvable span endpoints, leaving span unmodified");
        return TrimOutcome::unchanged(*span);
    };
    let Some(scope) = walk::lowest_common_ancestor(doc, start.node, end.node) else {
        debug!("trim: endpoints share no ancestor, leaving span unmodified");
        return TrimOutcome::unchanged(*span);
    };

    let raw = walk::span_text(doc, span).unwrap_or_default();

    let mut had_leading = false;
    let new_start = match TextWalker::at(doc, scope, start) {
        Some(mut walker) => {
            while walk::position_cmp(doc, &walker.locator(), &end) == Ordering::Less
                && walker.peek_next().is_some_and(char::is_whitespace)
            {
                walker.step_next();
                had_leading = true;
            }
            walker.locator()
        }
        None => start,
    };

    let mut had_trailing = false;
    let new_end = match TextWalker::at(doc, scope, end) {
        Some(mut walker) => {
            while walk::position_cmp(doc, &walker.locator(), &new_start) == Ordering::Greater
                && walker.peek_prev().is_some_and(char::is_whitespace)
            {
                walker.step_prev();
                had_trailing = true;
            }
            walker.locator()
        }
        None => end,
    };

    let trimmed = Span::new(new_start, new_end);
    let moved = trimmed != *span;
    let needs_cleaning = walk::clean_text(&raw) != raw;

    TrimOutcome {
        span: trimmed,
        adjusted: moved || needs_cleaning,
        had_leading_whitespace: had_leading,
        had_trailing_whitespace: had_trailing,
    }
}

/// Grow `span` outward until both edges sit on word boundaries.
///
/// Each endpoint scans within its *own* closest block ancestor and never
/// crosses a block boundary, at most [`MAX_EXPANSION_SCAN`] characters per
/// direction. Hyphens never stop the scan. A scan that exhausts the cap
/// without reaching a boundary leaves its edge where it started. Afterwards
/// any boundary characters left at the very edges of the grown span are shed
/// again.
pub fn expand_to_word_boundaries<D: DocumentRead>(
    doc: &D,
    span: &Span<D::Node>,
) -> AdjustOutcome<D::Node> {
    let (Some(start), Some(end)) = (
        walk::resolve_start(doc, &span.start),
        walk::resolve_end(doc, &span.end),
    ) else {
        debug!("expand: unresolvable span endpoints, leaving span unmodified");
        return AdjustOutcome::unchanged(*span);
    };
    let tags = BlockTags::default();

    let start_scope = walk::closest_block_ancestor(doc, start.node, &tags);
    let new_start = match TextWalker::at(doc, start_scope, start) {
        Some(mut walker) => {
            let mut steps = 0;
            while steps < MAX_EXPANSION_SCAN
                && walker.peek_prev().is_some_and(|ch| !is_boundary_char(ch))
            {
                walker.step_prev();
                steps += 1;
            }
            // Cap hit mid-word: a half-expanded edge is worse than none.
            if walker.peek_prev().is_some_and(|ch| !is_boundary_char(ch)) {
                start
            } else {
                walker.locator()
            }
        }
        None => start,
    };

    let end_scope = walk::closest_block_ancestor(doc, end.node, &tags);
    let new_end = match TextWalker::at(doc, end_scope, end) {
        Some(mut walker) => {
            let mut steps = 0;
            while steps < MAX_EXPANSION_SCAN
                && walker.peek_next().is_some_and(|ch| !is_boundary_char(ch))
            {
                walker.step_next();
                steps += 1;
            }
            if walker.peek_next().is_some_and(|ch| !is_boundary_char(ch)) {
                end
            } else {
                walker.locator()
            }
        }
        None => end,
    };

    let expanded = shed_boundary_edges(doc, Span::new(new_start, new_end));
    AdjustOutcome {
        adjusted: expanded != *span,
        span: expanded,
    }
}

/// Drop boundary characters sitting at the very edges of `span`.
///
/// Expansion stops *at* boundaries, but the original selection may have
/// included punctuation at its edges ("onial." grows to "testimonial.");
/// this pass sheds it. Hyphens are not boundary characters and stay.
fn shed_boundary_edges<D: DocumentRead>(doc: &D, span: Span<D::Node>) -> Span<D::Node> {
    let Some(scope) = walk::lowest_common_ancestor(doc, span.start.node, span.end.node) else {
        return span;
    };

    let mut start = span.start;
    if let Some(mut walker) = TextWalker::at(doc, scope, span.start) {
        while walk::position_cmp(doc, &walker.locator(), &span.end) == Ordering::Less
            && walker.peek_next().is_some_and(is_boundary_char)
        {
            walker.step_next();
        }
        start = walker.locator();
    }

    let mut end = span.end;
    if let Some(mut walker) = TextWalker::at(doc, scope, span.end) {
        while walk::position_cmp(doc, &walker.locator(), &start) == Ordering::Greater
            && walker.peek_prev().is_some_and(is_boundary_char)
        {
            walker.step_prev();
        }
        end = walker.locator();
    }

    Span::new(start, end)
}

/// The full adjustment pipeline applied to a raw user selection.
///
/// Trims first, classifies the trimmed span, then expands when the span is
/// an incomplete word, or a fragment that trimming left untouched.
/// Idempotent: feeding the output back in returns it unchanged.
pub fn adjust_selection_range<D: DocumentRead>(
    doc: &D,
    span: &Span<D::Node>,
) -> AdjustOutcome<D::Node> {
    let trim = trim_boundary_whitespace(doc, span);
    if trim.span.is_collapsed() {
        return AdjustOutcome {
            span: trim.span,
            adjusted: trim.adjusted,
        };
    }

    let cls = classify::classify(doc, &trim.span);
    let expand = match cls.kind {
        SpanKind::Word if !cls.is_complete => true,
        SpanKind::Fragment if !trim.adjusted => true,
        _ => false,
    };
    if !expand {
        return AdjustOutcome {
            span: trim.span,
            adjusted: trim.adjusted,
        };
    }

    let expanded = expand_to_word_boundaries(doc, &trim.span);
    AdjustOutcome {
        span: expanded.span,
        adjusted: trim.adjusted || expanded.adjusted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::tree::{NodeId, Tree};
    use crate::selection::span::Locator;
    use pretty_assertions::assert_eq;

    fn para(text: &str) -> (Tree, NodeId) {
        let mut tree = Tree::new("body");
        let p = tree.append_element(tree.root(), "p").unwrap();
        let t = tree.append_text(p, text).unwrap();
        (tree, t)
    }

    fn span_of(t: NodeId, start: usize, end: usize) -> Span<NodeId> {
        Span::new(Locator::new(t, start), Locator::new(t, end))
    }

    fn text_of(tree: &Tree, span: &Span<NodeId>) -> String {
        walk::span_text(tree, span).unwrap()
    }

    // ============ trim_boundary_whitespace ============

    #[test]
    fn test_trim_strips_both_edges() {
        let (tree, t) = para("  word  ");
        let result = trim_boundary_whitespace(&tree, &span_of(t, 0, 8));

        assert_eq!(text_of(&tree, &result.span), "word");
        assert!(result.adjusted);
        assert!(result.had_leading_whitespace);
        assert!(result.had_trailing_whitespace);
    }

    #[test]
    fn test_trim_clean_span_is_untouched() {
        let (tree, t) = para("word");
        let span = span_of(t, 0, 4);
        let result = trim_boundary_whitespace(&tree, &span);

        assert_eq!(result.span, span);
        assert!(!result.adjusted);
        assert!(!result.had_leading_whitespace);
        assert!(!result.had_trailing_whitespace);
    }

    #[test]
    fn test_trim_whitespace_only_collapses() {
        let (tree, t) = para("a    b");
        let result = trim_boundary_whitespace(&tree, &span_of(t, 1, 5));

        assert!(result.span.is_collapsed());
        assert_eq!(result.span.start, Locator::new(t, 5));
        assert!(result.adjusted);
    }

    #[test]
    fn test_trim_hops_across_text_nodes() {
        let mut tree = Tree::new("body");
        let p = tree.append_element(tree.root(), "p").unwrap();
        let t1 = tree.append_text(p, "first   ").unwrap();
        let t2 = tree.append_text(p, "  second").unwrap();

        let span = Span::new(Locator::new(t1, 5), Locator::new(t2, 2));
        let result = trim_boundary_whitespace(&tree, &span);

        // The selected "   "+"  " is all whitespace: collapsed.
        assert!(result.span.is_collapsed());

        let wider = Span::new(Locator::new(t1, 5), Locator::new(t2, 5));
        let trimmed = trim_boundary_whitespace(&tree, &wider);
        assert_eq!(text_of(&tree, &trimmed.span), "sec");
        assert_eq!(trimmed.span.start, Locator::new(t2, 2));
    }

    #[test]
    fn test_trim_nbsp_counts_as_whitespace() {
        let (tree, t) = para("\u{a0}\u{a0}gloss\u{a0}");
        let result = trim_boundary_whitespace(&tree, &span_of(t, 0, 8));
        assert_eq!(text_of(&tree, &result.span), "gloss");
    }

    #[test]
    fn test_trim_flags_internal_runs_without_moving() {
        let (tree, t) = para("two  spaces");
        let span = span_of(t, 0, 11);
        let result = trim_boundary_whitespace(&tree, &span);

        // No edge movement, but the text still needs cleaning.
        assert_eq!(result.span, span);
        assert!(result.adjusted);
        assert!(!result.had_leading_whitespace);
    }

    #[test]
    fn test_trim_collapsed_span_is_noop() {
        let (tree, t) = para("  x");
        let span = span_of(t, 1, 1);
        assert_eq!(trim_boundary_whitespace(&tree, &span), TrimOutcome::unchanged(span));
    }

    // ============ expand_to_word_boundaries ============

    #[test]
    fn test_expand_mid_word_selection() {
        let (tree, t) = para("This is a testimonial.");
        // "onial", inside the word.
        let result = expand_to_word_boundaries(&tree, &span_of(t, 16, 21));

        assert_eq!(text_of(&tree, &result.span), "testimonial");
        assert!(result.adjusted);
    }

    #[test]
    fn test_expand_keeps_hyphenated_compound_whole() {
        let (tree, t) = para("our co-founders met");
        // "found" inside the compound.
        let result = expand_to_word_boundaries(&tree, &span_of(t, 7, 12));
        assert_eq!(text_of(&tree, &result.span), "co-founders");
    }

    #[test]
    fn test_expand_crosses_inline_markup() {
        let mut tree = Tree::new("body");
        let p = tree.append_element(tree.root(), "p").unwrap();
        tree.append_text(p, "an extra").unwrap();
        let em = tree.append_element(p, "em").unwrap();
        let t2 = tree.append_text(em, "ordin").unwrap();
        tree.append_text(p, "ary word").unwrap();

        let result = expand_to_word_boundaries(&tree, &span_of(t2, 1, 4));
        assert_eq!(text_of(&tree, &result.span), "extraordinary");
    }

    #[test]
    fn test_expand_never_crosses_block_boundary() {
        let mut tree = Tree::new("body");
        let p1 = tree.append_element(tree.root(), "p").unwrap();
        tree.append_text(p1, "first").unwrap();
        let p2 = tree.append_element(tree.root(), "p").unwrap();
        let t2 = tree.append_text(p2, "second").unwrap();

        // Start of "second": nothing to the left within its paragraph.
        let result = expand_to_word_boundaries(&tree, &span_of(t2, 0, 6));
        assert_eq!(text_of(&tree, &result.span), "second");
        assert!(!result.adjusted);
    }

    #[test]
    fn test_expand_sheds_edge_punctuation() {
        let (tree, t) = para("This is a testimonial. Next");
        // "onial." including the period.
        let result = expand_to_word_boundaries(&tree, &span_of(t, 15, 22));
        assert_eq!(text_of(&tree, &result.span), "testimonial");
    }

    #[test]
    fn test_expand_complete_word_is_noop() {
        let (tree, t) = para("a word here");
        let span = span_of(t, 2, 6);
        let result = expand_to_word_boundaries(&tree, &span);
        assert_eq!(result.span, span);
        assert!(!result.adjusted);
    }

    #[test]
    fn test_expand_gives_up_when_no_boundary_in_reach() {
        let long = "x".repeat(200);
        let (tree, t) = para(&long);
        let span = span_of(t, 100, 101);
        let result = expand_to_word_boundaries(&tree, &span);

        // No boundary within MAX_EXPANSION_SCAN on either side: both edges
        // stay where the selection put them.
        assert_eq!(result.span, span);
        assert!(!result.adjusted);
    }

    #[test]
    fn test_expand_each_edge_reverts_independently_at_the_cap() {
        let long = format!("ab {}", "x".repeat(100));
        let (tree, t) = para(&long);
        let result = expand_to_word_boundaries(&tree, &span_of(t, 5, 6));

        // The left scan reaches the space after "ab"; the right scan runs
        // out of budget and leaves the end edge untouched.
        assert_eq!(
            result.span,
            Span::new(Locator::new(t, 3), Locator::new(t, 6))
        );
    }

    #[test]
    fn test_expand_keeps_decomposed_accents() {
        // NFD text: the acute accent is its own char after the "e".
        let (tree, t) = para("cafe\u{301} au lait");
        let result = expand_to_word_boundaries(&tree, &span_of(t, 1, 3));
        assert_eq!(text_of(&tree, &result.span), "cafe\u{301}");
    }

    #[test]
    fn test_expand_cjk_word_between_ideographs() {
        let (tree, t) = para("这里有一个light单词");
        let result = expand_to_word_boundaries(&tree, &span_of(t, 6, 9));

        // CJK ideographs count as word characters, so expansion runs to the
        // block edges; there is no whitespace to stop at.
        assert_eq!(text_of(&tree, &result.span), "这里有一个light单词");
    }

    // ============ adjust_selection_range ============

    #[test]
    fn test_adjust_trims_then_expands_word() {
        let (tree, t) = para("This is a testimonial.");
        let result = adjust_selection_range(&tree, &span_of(t, 9, 20));

        // " testimonia" -> trim -> "testimonia" (incomplete word) -> expand.
        assert_eq!(text_of(&tree, &result.span), "testimonial");
        assert!(result.adjusted);
    }

    #[test]
    fn test_adjust_leaves_complete_word_alone() {
        let (tree, t) = para("a word here");
        let span = span_of(t, 2, 6);
        let result = adjust_selection_range(&tree, &span);
        assert_eq!(result.span, span);
        assert!(!result.adjusted);
    }

    #[test]
    fn test_adjust_expands_untrimmed_fragment() {
        let (tree, t) = para("The quick brown fox jumps");
        // "uick brown fo": clean edges, multiple words.
        let result = adjust_selection_range(&tree, &span_of(t, 5, 18));
        assert_eq!(text_of(&tree, &result.span), "quick brown fox");
    }

    #[test]
    fn test_adjust_trimmed_fragment_is_not_expanded() {
        let (tree, t) = para("The quick brown fox jumps");
        // " quick brown " trims to a fragment; trimming already adjusted it.
        let result = adjust_selection_range(&tree, &span_of(t, 3, 16));
        assert_eq!(text_of(&tree, &result.span), "quick brown");
        assert!(result.adjusted);
    }

    #[test]
    fn test_adjust_whitespace_only_selection_collapses() {
        let (tree, t) = para("a   b");
        let result = adjust_selection_range(&tree, &span_of(t, 1, 4));
        assert!(result.span.is_collapsed());
        assert!(result.adjusted);
    }

    #[test]
    fn test_adjust_is_idempotent() {
        let cases: &[(&str, usize, usize)] = &[
            ("This is a testimonial.", 15, 20),
            ("This is a testimonial.", 14, 21),
            ("The quick brown fox jumps", 5, 18),
            ("The quick brown fox jumps", 3, 16),
            ("  word  ", 0, 8),
            ("our co-founders met", 7, 12),
        ];
        for &(text, start, end) in cases {
            let (tree, t) = para(text);
            let once = adjust_selection_range(&tree, &span_of(t, start, end));
            let twice = adjust_selection_range(&tree, &once.span);
            assert_eq!(
                twice.span, once.span,
                "not idempotent for {text:?} [{start}..{end}]"
            );
        }
    }

    #[test]
    fn test_adjust_is_idempotent_past_the_scan_cap() {
        let long = "x".repeat(200);
        let (tree, t) = para(&long);
        let once = adjust_selection_range(&tree, &span_of(t, 100, 101));
        let twice = adjust_selection_range(&tree, &once.span);
        assert_eq!(twice.span, once.span);
    }
}
