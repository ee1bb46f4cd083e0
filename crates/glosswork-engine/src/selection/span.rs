use serde::{Deserialize, Serialize};

/// A position inside the document tree: a node plus a character offset.
///
/// On a text node the offset counts characters into its content (`0..=len`,
/// the cursor sits *between* characters). On an element node the offset is a
/// child index, DOM boundary-point style; the engine resolves such locators
/// onto the nearest text position before doing any character work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> Locator<N> {
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// An ordered pair of locators, `start <= end` in document order.
///
/// A collapsed span (`start == end`) represents "no selection". The engine
/// never reorders a span; callers are expected to hand in document-ordered
/// endpoints, as selection APIs do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span<N> {
    pub start: Locator<N>,
    pub end: Locator<N>,
}

impl<N: Copy + PartialEq> Span<N> {
    pub fn new(start: Locator<N>, end: Locator<N>) -> Self {
        Self { start, end }
    }

    /// A zero-width span at `at`.
    pub fn collapsed(at: Locator<N>) -> Self {
        Self { start: at, end: at }
    }

    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}
