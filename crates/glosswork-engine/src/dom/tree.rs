use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dom::traits::DocumentRead;

/// Stable handle into a [`Tree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

/// Errors from building a [`Tree`].
///
/// Reading a tree never fails; only the mutable builder API does.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {0:?} is not part of this tree")]
    UnknownNode(NodeId),
    #[error("text node {0:?} cannot have children")]
    TextParent(NodeId),
}

#[cfg(test)]
impl NodeId {
    /// Fabricate a handle pointing outside any tree, to exercise the
    /// vanished-node degradation paths.
    pub(crate) fn from_raw_for_tests(raw: u32) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Text(String),
    Element { tag: String, overlay: bool },
}

#[derive(Debug, Clone)]
struct NodeEntry {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed in-memory document tree.
///
/// This is the reference [`DocumentRead`] host: the unit and integration
/// tests build fixtures with it, and embedders without a live DOM can use it
/// directly. Nodes are appended depth-first through the builder methods and
/// are never removed, so `NodeId`s stay valid for the life of the tree.
///
/// ```
/// use glosswork_engine::dom::{DocumentRead, Tree};
///
/// let mut tree = Tree::new("body");
/// let p = tree.append_element(tree.root(), "p").unwrap();
/// let t = tree.append_text(p, "Hello world").unwrap();
/// assert_eq!(tree.text(t), Some("Hello world"));
/// assert_eq!(tree.tag(p), Some("p"));
/// ```
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<NodeEntry>,
}

impl Tree {
    /// Create a tree with a single root element of the given tag.
    pub fn new(root_tag: &str) -> Self {
        Self {
            nodes: vec![NodeEntry {
                data: NodeData::Element {
                    tag: root_tag.to_ascii_lowercase(),
                    overlay: false,
                },
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Append an element node under `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, TreeError> {
        self.push(
            parent,
            NodeData::Element {
                tag: tag.to_ascii_lowercase(),
                overlay: false,
            },
        )
    }

    /// Append an overlay element under `parent`.
    ///
    /// The whole subtree rooted here is excluded from every engine text read,
    /// matching markup the tool injected itself (tooltips, gloss highlights).
    pub fn append_overlay(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, TreeError> {
        self.push(
            parent,
            NodeData::Element {
                tag: tag.to_ascii_lowercase(),
                overlay: true,
            },
        )
    }

    /// Append a text node under `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, TreeError> {
        self.push(parent, NodeData::Text(text.to_string()))
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> Result<NodeId, TreeError> {
        let entry = self
            .nodes
            .get(parent.0 as usize)
            .ok_or(TreeError::UnknownNode(parent))?;
        if matches!(entry.data, NodeData::Text(_)) {
            return Err(TreeError::TextParent(parent));
        }

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeEntry {
            data,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0 as usize].children.push(id);
        Ok(id)
    }

    fn entry(&self, node: NodeId) -> Option<&NodeEntry> {
        self.nodes.get(node.0 as usize)
    }
}

impl DocumentRead for Tree {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.entry(node)?.parent
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.entry(node).map_or(0, |e| e.children.len())
    }

    fn child(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.entry(node)?.children.get(index).copied()
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match &self.entry(node)?.data {
            NodeData::Text(text) => Some(text),
            NodeData::Element { .. } => None,
        }
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.entry(node)?.data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    fn is_overlay(&self, node: NodeId) -> bool {
        matches!(
            self.entry(node).map(|e| &e.data),
            Some(NodeData::Element { overlay: true, .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_tree_has_element_root() {
        let tree = Tree::new("BODY");
        assert_eq!(tree.tag(tree.root()), Some("body"));
        assert_eq!(tree.text(tree.root()), None);
        assert_eq!(tree.parent(tree.root()), None);
        assert_eq!(tree.child_count(tree.root()), 0);
    }

    #[test]
    fn test_append_preserves_document_order() {
        let mut tree = Tree::new("body");
        let p = tree.append_element(tree.root(), "p").unwrap();
        let a = tree.append_text(p, "one").unwrap();
        let em = tree.append_element(p, "em").unwrap();
        let b = tree.append_text(em, "two").unwrap();

        assert_eq!(tree.child_count(p), 2);
        assert_eq!(tree.child(p, 0), Some(a));
        assert_eq!(tree.child(p, 1), Some(em));
        assert_eq!(tree.child(em, 0), Some(b));
        assert_eq!(tree.parent(b), Some(em));
        assert_eq!(tree.parent(em), Some(p));
    }

    #[test]
    fn test_append_under_text_node_is_rejected() {
        let mut tree = Tree::new("body");
        let t = tree.append_text(tree.root(), "leaf").unwrap();

        assert_eq!(
            tree.append_text(t, "nested"),
            Err(TreeError::TextParent(t))
        );
        assert_eq!(
            tree.append_element(t, "span"),
            Err(TreeError::TextParent(t))
        );
    }

    #[test]
    fn test_append_under_unknown_node_is_rejected() {
        let mut tree = Tree::new("body");
        let bogus = NodeId(42);
        assert_eq!(
            tree.append_text(bogus, "x"),
            Err(TreeError::UnknownNode(bogus))
        );
    }

    #[test]
    fn test_overlay_flag_only_on_overlay_elements() {
        let mut tree = Tree::new("body");
        let p = tree.append_element(tree.root(), "p").unwrap();
        let tip = tree.append_overlay(p, "span").unwrap();
        let inner = tree.append_text(tip, "tooltip text").unwrap();

        assert!(tree.is_overlay(tip));
        assert!(!tree.is_overlay(p));
        // The flag marks the subtree root; descendants answer for themselves.
        assert!(!tree.is_overlay(inner));
    }

    #[test]
    fn test_vanished_node_degrades_to_empty_answers() {
        let tree = Tree::new("body");
        let gone = NodeId(99);
        assert_eq!(tree.parent(gone), None);
        assert_eq!(tree.child_count(gone), 0);
        assert_eq!(tree.child(gone, 0), None);
        assert_eq!(tree.text(gone), None);
        assert_eq!(tree.tag(gone), None);
        assert!(!tree.is_overlay(gone));
    }
}
