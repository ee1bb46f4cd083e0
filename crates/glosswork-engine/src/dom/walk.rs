//! Document-order traversal primitives over [`DocumentRead`].
//!
//! Everything in this module is read-only and bounded: depth-first walks use
//! an explicit stack with a node budget, ancestor walks carry a depth guard,
//! and a host returning `None` mid-navigation aborts the affected branch
//! instead of erroring. Callers above this layer only ever see degraded
//! (empty/unmodified) results.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::dom::traits::DocumentRead;
use crate::selection::span::{Locator, Span};

/// Upper bound on nodes visited by a single subtree walk.
const NODE_SCAN_LIMIT: usize = 65_536;

/// Upper bound on ancestor-chain length (defends against host cycles).
const MAX_DEPTH: usize = 512;

static WS_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Collapse every whitespace run (including NBSP and newlines) to one space.
///
/// Leading/trailing whitespace is kept as a single space rather than
/// stripped; sentence assembly relies on those edge spaces surviving.
pub fn clean_text(raw: &str) -> String {
    WS_RUN.replace_all(raw, " ").into_owned()
}

/// Set of lowercase tag names treated as block-level containers.
///
/// Sentence- and word-scoped scans never cross a block boundary, so this set
/// decides how far outward any scan may reach. The default covers the common
/// flow containers; hosts with custom elements can extend it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTags(BTreeSet<String>);

const DEFAULT_BLOCK_TAGS: &[&str] = &[
    "body",
    "article",
    "section",
    "main",
    "div",
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "li",
    "dt",
    "dd",
    "blockquote",
    "pre",
    "td",
    "th",
    "figcaption",
];

impl BlockTags {
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn insert(&mut self, tag: &str) {
        self.0.insert(tag.to_ascii_lowercase());
    }
}

impl Default for BlockTags {
    fn default() -> Self {
        Self(
            DEFAULT_BLOCK_TAGS
                .iter()
                .map(|tag| (*tag).to_string())
                .collect(),
        )
    }
}

impl FromIterator<String> for BlockTags {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().map(|t| t.to_ascii_lowercase()).collect())
    }
}

// ---------------------------------------------------------------------------
// Character helpers (locator offsets count characters, not bytes)
// ---------------------------------------------------------------------------

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub(crate) fn char_at(text: &str, index: usize) -> Option<char> {
    text.chars().nth(index)
}

/// Slice `text` by character positions, clamping out-of-range bounds.
pub(crate) fn char_slice(text: &str, start: usize, end: usize) -> String {
    if end <= start {
        return String::new();
    }
    text.chars().skip(start).take(end - start).collect()
}

// ---------------------------------------------------------------------------
// Ancestry and document order
// ---------------------------------------------------------------------------

/// `node` followed by its ancestors up to the root, in order.
pub(crate) fn ancestor_chain<D: DocumentRead>(doc: &D, node: D::Node) -> Vec<D::Node> {
    let mut chain = vec![node];
    let mut current = node;
    while let Some(parent) = doc.parent(current) {
        if chain.len() >= MAX_DEPTH {
            trace!("ancestor chain exceeded depth guard; aborting walk");
            break;
        }
        chain.push(parent);
        current = parent;
    }
    chain
}

/// True when `node` or any of its ancestors is overlay markup.
pub fn is_inside_overlay<D: DocumentRead>(doc: &D, node: D::Node) -> bool {
    ancestor_chain(doc, node).iter().any(|n| doc.is_overlay(*n))
}

/// Deepest node present in both ancestor chains.
pub(crate) fn lowest_common_ancestor<D: DocumentRead>(
    doc: &D,
    a: D::Node,
    b: D::Node,
) -> Option<D::Node> {
    let ancestors_of_b = ancestor_chain(doc, b);
    ancestor_chain(doc, a)
        .into_iter()
        .find(|n| ancestors_of_b.contains(n))
}

/// Closest self-or-ancestor element whose tag is in `tags`.
///
/// Falls back to the topmost reachable node when no tagged block encloses
/// `node` (detached fragments still get a scan scope that way).
pub fn closest_block_ancestor<D: DocumentRead>(doc: &D, node: D::Node, tags: &BlockTags) -> D::Node {
    let chain = ancestor_chain(doc, node);
    for candidate in &chain {
        if let Some(tag) = doc.tag(*candidate)
            && tags.contains(tag)
        {
            return *candidate;
        }
    }
    *chain.last().unwrap_or(&node)
}

fn child_index<D: DocumentRead>(doc: &D, parent: D::Node, node: D::Node) -> Option<usize> {
    (0..doc.child_count(parent)).find(|&i| doc.child(parent, i) == Some(node))
}

/// Child-index path from the root down to `node`.
fn node_path<D: DocumentRead>(doc: &D, node: D::Node) -> Vec<usize> {
    let mut path = Vec::new();
    let mut current = node;
    let mut depth = 0;
    while let Some(parent) = doc.parent(current) {
        depth += 1;
        if depth > MAX_DEPTH {
            trace!("node path exceeded depth guard; aborting walk");
            break;
        }
        match child_index(doc, parent, current) {
            Some(index) => path.push(index),
            None => {
                // Host no longer lists us under our parent; abort the branch.
                trace!("node vanished from its parent during path computation");
                break;
            }
        }
        current = parent;
    }
    path.reverse();
    path
}

/// Compare two locators in document order.
///
/// A locator on a text node orders by character offset; a locator on an
/// element orders by child index, sitting immediately before the child it
/// indexes (DOM boundary-point semantics). Unresolvable positions compare
/// `Equal`, which every caller treats as the degraded "no relation" answer.
pub fn position_cmp<D: DocumentRead>(
    doc: &D,
    a: &Locator<D::Node>,
    b: &Locator<D::Node>,
) -> Ordering {
    if a.node == b.node {
        return a.offset.cmp(&b.offset);
    }

    let path_a = node_path(doc, a.node);
    let path_b = node_path(doc, b.node);

    for (ia, ib) in path_a.iter().zip(path_b.iter()) {
        match ia.cmp(ib) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    // One node is an ancestor of the other: the ancestor's offset is a child
    // index, compared against the descendant's next path step.
    match path_a.len().cmp(&path_b.len()) {
        Ordering::Less => match path_b.get(path_a.len()) {
            Some(&step) if a.offset > step => Ordering::Greater,
            Some(_) => Ordering::Less,
            None => Ordering::Equal,
        },
        Ordering::Greater => match path_a.get(path_b.len()) {
            Some(&step) if b.offset > step => Ordering::Less,
            Some(_) => Ordering::Greater,
            None => Ordering::Equal,
        },
        Ordering::Equal => Ordering::Equal,
    }
}

// ---------------------------------------------------------------------------
// Text-node enumeration and locator resolution
// ---------------------------------------------------------------------------

/// All text nodes under `scope` in document order, skipping overlay subtrees.
pub(crate) fn text_nodes_in<D: DocumentRead>(doc: &D, scope: D::Node) -> Vec<D::Node> {
    let mut out = Vec::new();
    let mut stack = vec![scope];
    let mut visited = 0usize;

    while let Some(node) = stack.pop() {
        visited += 1;
        if visited > NODE_SCAN_LIMIT {
            trace!("subtree walk exceeded node budget; truncating");
            break;
        }
        if doc.is_overlay(node) {
            continue;
        }
        if doc.is_text(node) {
            out.push(node);
            continue;
        }
        for index in (0..doc.child_count(node)).rev() {
            if let Some(child) = doc.child(node, index) {
                stack.push(child);
            }
        }
    }
    out
}

/// Normalize a start locator onto a text node.
///
/// An element locator (offset = child index) resolves forward to the first
/// text position at or after that child. Locators inside overlay markup, or
/// with no text to land on, are unresolvable.
pub(crate) fn resolve_start<D: DocumentRead>(
    doc: &D,
    locator: &Locator<D::Node>,
) -> Option<Locator<D::Node>> {
    if is_inside_overlay(doc, locator.node) {
        trace!("start locator sits inside overlay markup");
        return None;
    }
    if let Some(text) = doc.text(locator.node) {
        return Some(Locator::new(locator.node, locator.offset.min(char_len(text))));
    }
    for index in locator.offset..doc.child_count(locator.node) {
        let child = doc.child(locator.node, index)?;
        if let Some(first) = text_nodes_in(doc, child).first() {
            return Some(Locator::new(*first, 0));
        }
    }
    None
}

/// Normalize an end locator onto a text node, resolving backward.
pub(crate) fn resolve_end<D: DocumentRead>(
    doc: &D,
    locator: &Locator<D::Node>,
) -> Option<Locator<D::Node>> {
    if is_inside_overlay(doc, locator.node) {
        trace!("end locator sits inside overlay markup");
        return None;
    }
    if let Some(text) = doc.text(locator.node) {
        return Some(Locator::new(locator.node, locator.offset.min(char_len(text))));
    }
    let upper = locator.offset.min(doc.child_count(locator.node));
    for index in (0..upper).rev() {
        let child = doc.child(locator.node, index)?;
        if let Some(last) = text_nodes_in(doc, child).last() {
            let len = doc.text(*last).map(char_len).unwrap_or(0);
            return Some(Locator::new(*last, len));
        }
    }
    None
}

/// Raw (uncollapsed) text covered by `span`, overlay subtrees excluded.
///
/// Returns `None` when either endpoint cannot be resolved onto a text node
/// reachable from their common ancestor; callers degrade from there.
pub fn span_text<D: DocumentRead>(doc: &D, span: &Span<D::Node>) -> Option<String> {
    let start = resolve_start(doc, &span.start)?;
    let end = resolve_end(doc, &span.end)?;
    let scope = lowest_common_ancestor(doc, start.node, end.node)?;
    let nodes = text_nodes_in(doc, scope);
    let si = nodes.iter().position(|n| *n == start.node)?;
    let ei = nodes.iter().position(|n| *n == end.node)?;
    if si > ei {
        return None;
    }

    if si == ei {
        let text = doc.text(start.node)?;
        return Some(char_slice(text, start.offset, end.offset));
    }

    let mut out = String::new();
    for (index, node) in nodes[si..=ei].iter().enumerate() {
        let text = doc.text(*node)?;
        if index == 0 {
            out.push_str(&char_slice(text, start.offset, char_len(text)));
        } else if si + index == ei {
            out.push_str(&char_slice(text, 0, end.offset));
        } else {
            out.push_str(text);
        }
    }
    Some(out)
}

// ---------------------------------------------------------------------------
// Bounded character cursor
// ---------------------------------------------------------------------------

/// Restartable character cursor over the text nodes of one scope.
///
/// The cursor sits *between* characters, exactly like a locator. `peek_prev`
/// and `peek_next` look across text-node joins without moving; `step_prev`
/// and `step_next` move one character at a time. Callers own the step
/// budget, keeping every scan bounded regardless of tree shape.
pub(crate) struct TextWalker<'d, D: DocumentRead> {
    doc: &'d D,
    nodes: Vec<D::Node>,
    node_idx: usize,
    offset: usize,
}

impl<'d, D: DocumentRead> TextWalker<'d, D> {
    /// Position a walker at `at` (which must be a text locator) within the
    /// text-node sequence of `scope`.
    pub(crate) fn at(doc: &'d D, scope: D::Node, at: Locator<D::Node>) -> Option<Self> {
        let nodes = text_nodes_in(doc, scope);
        let node_idx = nodes.iter().position(|n| *n == at.node)?;
        let len = doc.text(at.node).map(char_len)?;
        Some(Self {
            doc,
            nodes,
            node_idx,
            offset: at.offset.min(len),
        })
    }

    pub(crate) fn locator(&self) -> Locator<D::Node> {
        Locator::new(self.nodes[self.node_idx], self.offset)
    }

    fn node_text(&self, index: usize) -> Option<&'d str> {
        self.doc.text(*self.nodes.get(index)?)
    }

    /// Character immediately before the cursor, hopping across nodes.
    pub(crate) fn peek_prev(&self) -> Option<char> {
        if self.offset > 0 {
            return char_at(self.node_text(self.node_idx)?, self.offset - 1);
        }
        for index in (0..self.node_idx).rev() {
            if let Some(text) = self.node_text(index)
                && let Some(ch) = text.chars().next_back()
            {
                return Some(ch);
            }
        }
        None
    }

    /// Character immediately after the cursor, hopping across nodes.
    pub(crate) fn peek_next(&self) -> Option<char> {
        if let Some(text) = self.node_text(self.node_idx)
            && let Some(ch) = char_at(text, self.offset)
        {
            return Some(ch);
        }
        for index in self.node_idx + 1..self.nodes.len() {
            if let Some(text) = self.node_text(index)
                && let Some(ch) = text.chars().next()
            {
                return Some(ch);
            }
        }
        None
    }

    /// Move one character left; returns the character crossed.
    pub(crate) fn step_prev(&mut self) -> Option<char> {
        if self.offset > 0 {
            self.offset -= 1;
            return char_at(self.node_text(self.node_idx)?, self.offset);
        }
        for index in (0..self.node_idx).rev() {
            if let Some(text) = self.node_text(index) {
                let len = char_len(text);
                if len > 0 {
                    self.node_idx = index;
                    self.offset = len - 1;
                    return char_at(text, self.offset);
                }
            }
        }
        None
    }

    /// Move one character right; returns the character crossed.
    pub(crate) fn step_next(&mut self) -> Option<char> {
        if let Some(text) = self.node_text(self.node_idx)
            && let Some(ch) = char_at(text, self.offset)
        {
            self.offset += 1;
            return Some(ch);
        }
        for index in self.node_idx + 1..self.nodes.len() {
            if let Some(text) = self.node_text(index)
                && let Some(ch) = text.chars().next()
            {
                self.node_idx = index;
                self.offset = 1;
                return Some(ch);
            }
        }
        None
    }
}
