/// Read-only access to a host-owned document tree.
///
/// The engine treats the tree as an ordered tree of three node flavors:
///
/// - **text nodes**: own a character sequence, returned by [`text`];
/// - **element nodes**: formatting wrappers and block containers, returned
///   by [`tag`] (whether an element is *block-level* is decided by the
///   caller's tag set, not by the host);
/// - **overlay nodes**: elements whose whole subtree was injected by the
///   tool itself (tooltip, icon, gloss highlight) and must be invisible to
///   every text read, flagged via [`is_overlay`].
///
/// A node is either a text node or an element node, never both. Hosts with
/// other node types (comments, processing instructions) should present them
/// as elements with no children or hide them entirely.
///
/// All methods are infallible lookups that return `None`/`0` for nodes the
/// host no longer knows about. The engine interprets a missing node as "this
/// branch of the scan is gone" and degrades, so a host wrapping a live DOM
/// does not need snapshot semantics, only the single-UI-thread guarantee
/// that nothing mutates the tree *during* one engine call.
///
/// [`text`]: DocumentRead::text
/// [`tag`]: DocumentRead::tag
/// [`is_overlay`]: DocumentRead::is_overlay
pub trait DocumentRead {
    /// Cheap copyable node handle (an id, an index, a pointer wrapper).
    type Node: Copy + Eq + std::fmt::Debug;

    /// The root node of the document.
    fn root(&self) -> Self::Node;

    /// Parent of `node`, or `None` for the root (or a vanished node).
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Number of children of `node`. Text nodes report 0.
    fn child_count(&self, node: Self::Node) -> usize;

    /// The `index`-th child of `node`, in document order.
    fn child(&self, node: Self::Node, index: usize) -> Option<Self::Node>;

    /// Character content of a text node, `None` for element nodes.
    fn text(&self, node: Self::Node) -> Option<&str>;

    /// Lowercase tag name of an element node, `None` for text nodes.
    fn tag(&self, node: Self::Node) -> Option<&str>;

    /// True when `node` is the root of tool-injected overlay markup.
    ///
    /// Descendants of an overlay node do not need to report true themselves;
    /// the engine checks the ancestor chain.
    fn is_overlay(&self, node: Self::Node) -> bool;

    /// Whether `node` is a text node.
    fn is_text(&self, node: Self::Node) -> bool {
        self.text(node).is_some()
    }
}
