use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::traits::DocumentRead;
use crate::dom::walk::{self, position_cmp};
use crate::selection::span::Span;

/// A previously placed annotation: a stable id plus the span it occupies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor<N> {
    pub id: String,
    pub span: Span<N>,
}

impl<N> Anchor<N> {
    pub fn new(id: impl Into<String>, span: Span<N>) -> Self {
        Self {
            id: id.into(),
            span,
        }
    }
}

/// Ids of the anchors whose spans intersect `span`, in the order supplied.
///
/// Intersection is strict: an anchor that merely touches the query span at
/// an edge shares no text and is not reported. Containment in either
/// direction counts, and each member of a nested anchor pair is reported
/// independently whenever the query reaches into it.
pub fn find_overlapping<D: DocumentRead>(
    doc: &D,
    span: &Span<D::Node>,
    anchors: &[Anchor<D::Node>],
) -> Vec<String> {
    if span.is_collapsed() {
        return Vec::new();
    }
    let (Some(query_start), Some(query_end)) = (
        walk::resolve_start(doc, &span.start),
        walk::resolve_end(doc, &span.end),
    ) else {
        debug!("overlap: unresolvable query span, reporting no anchors");
        return Vec::new();
    };
    if position_cmp(doc, &query_start, &query_end) != Ordering::Less {
        return Vec::new();
    }

    let mut ids = Vec::new();
    for anchor in anchors {
        let (Some(anchor_start), Some(anchor_end)) = (
            walk::resolve_start(doc, &anchor.span.start),
            walk::resolve_end(doc, &anchor.span.end),
        ) else {
            // The anchor's nodes are gone (host removed them); skip it.
            debug!(id = %anchor.id, "overlap: anchor span no longer resolvable");
            continue;
        };
        // A collapsed anchor owns no text, so it can never share any.
        if position_cmp(doc, &anchor_start, &anchor_end) != Ordering::Less {
            continue;
        }

        let starts_before_query_ends =
            position_cmp(doc, &anchor_start, &query_end) == Ordering::Less;
        let query_starts_before_it_ends =
            position_cmp(doc, &query_start, &anchor_end) == Ordering::Less;
        if starts_before_query_ends && query_starts_before_it_ends {
            ids.push(anchor.id.clone());
        }
    }
    ids
}

/// Caller-owned registry of placed anchors.
///
/// Holds the anchor list and the id counter that would otherwise live in
/// hidden module state; callers thread one registry value through the
/// "insert gloss, then clean up what it overlapped" flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorRegistry<N> {
    anchors: Vec<Anchor<N>>,
    next_id: u64,
}

impl<N: Copy + Eq + std::fmt::Debug> Default for AnchorRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Copy + Eq + std::fmt::Debug> AnchorRegistry<N> {
    pub fn new() -> Self {
        Self {
            anchors: Vec::new(),
            next_id: 0,
        }
    }

    /// Record a new anchor over `span` and mint its id.
    pub fn register(&mut self, span: Span<N>) -> String {
        self.next_id += 1;
        let id = format!("anchor-{}", self.next_id);
        self.anchors.push(Anchor::new(id.clone(), span));
        id
    }

    pub fn anchors(&self) -> &[Anchor<N>] {
        &self.anchors
    }

    pub fn get(&self, id: &str) -> Option<&Anchor<N>> {
        self.anchors.iter().find(|anchor| anchor.id == id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Anchor<N>> {
        let index = self.anchors.iter().position(|anchor| anchor.id == id)?;
        Some(self.anchors.remove(index))
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Ids of registered anchors intersecting `span`, in registration order.
    pub fn overlapping<D>(&self, doc: &D, span: &Span<N>) -> Vec<String>
    where
        D: DocumentRead<Node = N>,
    {
        find_overlapping(doc, span, &self.anchors)
    }

    /// Drop every anchor intersecting `span`; returns the removed ids.
    ///
    /// This is the cleanup half of placing a new gloss over old ones.
    pub fn remove_overlapping<D>(&mut self, doc: &D, span: &Span<N>) -> Vec<String>
    where
        D: DocumentRead<Node = N>,
    {
        let removed = self.overlapping(doc, span);
        self.anchors.retain(|anchor| !removed.contains(&anchor.id));
        removed
    }
}
