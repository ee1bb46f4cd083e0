use tracing::debug;

use crate::dom::traits::DocumentRead;
use crate::dom::walk::{self, BlockTags, char_len, char_slice};
use crate::selection::span::{Locator, Span};

/// Split a span crossing block boundaries into one sub-span per block.
///
/// Text nodes intersecting the span are walked in document order (overlay
/// subtrees skipped) and grouped by their nearest block ancestor; each group
/// becomes a sub-span, clamped to the original endpoints at the extremities.
/// Groups whose text trims to nothing are dropped, so every returned
/// sub-span carries visible content. A collapsed or unreadable span yields
/// an empty list.
pub fn split_by_blocks<D: DocumentRead>(doc: &D, span: &Span<D::Node>) -> Vec<Span<D::Node>> {
    if span.is_collapsed() {
        return Vec::new();
    }
    let (Some(start), Some(end)) = (
        walk::resolve_start(doc, &span.start),
        walk::resolve_end(doc, &span.end),
    ) else {
        debug!("split: unresolvable span endpoints, returning no sub-spans");
        return Vec::new();
    };
    let Some(scope) = walk::lowest_common_ancestor(doc, start.node, end.node) else {
        debug!("split: endpoints share no ancestor, returning no sub-spans");
        return Vec::new();
    };

    let nodes = walk::text_nodes_in(doc, scope);
    let (Some(si), Some(ei)) = (
        nodes.iter().position(|n| *n == start.node),
        nodes.iter().position(|n| *n == end.node),
    ) else {
        return Vec::new();
    };
    if si > ei {
        return Vec::new();
    }

    let tags = BlockTags::default();
    let mut sub_spans = Vec::new();
    let mut group: Vec<D::Node> = Vec::new();
    let mut group_block: Option<D::Node> = None;

    for node in &nodes[si..=ei] {
        let block = walk::closest_block_ancestor(doc, *node, &tags);
        if group_block.is_some_and(|current| current != block) {
            close_group(doc, &group, &start, &end, &mut sub_spans);
            group.clear();
        }
        group_block = Some(block);
        group.push(*node);
    }
    close_group(doc, &group, &start, &end, &mut sub_spans);

    sub_spans
}

/// Turn one per-block run of text nodes into a sub-span, clamped to the
/// original selection at the outer edges. Empty-after-trim groups are
/// discarded.
fn close_group<D: DocumentRead>(
    doc: &D,
    group: &[D::Node],
    start: &Locator<D::Node>,
    end: &Locator<D::Node>,
    sub_spans: &mut Vec<Span<D::Node>>,
) {
    let (Some(first), Some(last)) = (group.first(), group.last()) else {
        return;
    };

    let sub_start = if *first == start.node {
        *start
    } else {
        Locator::new(*first, 0)
    };
    let sub_end = if *last == end.node {
        *end
    } else {
        Locator::new(*last, doc.text(*last).map(char_len).unwrap_or(0))
    };

    let mut text = String::new();
    for node in group {
        let Some(content) = doc.text(*node) else {
            continue;
        };
        let from = if *node == sub_start.node { sub_start.offset } else { 0 };
        let to = if *node == sub_end.node {
            sub_end.offset
        } else {
            char_len(content)
        };
        text.push_str(&char_slice(content, from, to));
    }
    if text.trim().is_empty() {
        return;
    }

    sub_spans.push(Span::new(sub_start, sub_end));
}
