/*!
 * # Document Tree Access
 *
 * The selection engine never owns the document it reads. The host (a browser
 * content script, a test fixture, an embedding app) owns a live, mutable tree
 * of text, inline and block nodes, and the engine only ever *reads* it. This
 * module defines that seam:
 *
 * - **`DocumentRead`**: the minimal read-only trait the engine needs. A host
 *   exposes parent/child navigation, text content, element tags, and whether
 *   a node is the root of tool-injected overlay markup (tooltips, icons,
 *   previously placed glosses) that must be excluded from every text read.
 * - **`Tree`**: an arena-backed in-memory implementation of `DocumentRead`.
 *   It backs the whole test suite and works as a reference host for
 *   embedders that don't have a DOM of their own.
 * - **`walk`**: document-order traversal built on top of `DocumentRead`:
 *   text-node enumeration scoped to a subtree, locator ordering, common
 *   ancestors, bounded character cursors, and overlay-excluded text reads.
 *
 * Everything here is synchronous and bounded. Traversals carry explicit node
 * budgets and navigation treats a `None` from the host (a node removed under
 * us) as "abort this branch", never as an error that escapes the engine.
 */

pub mod traits;
pub mod tree;
pub mod walk;

pub use traits::DocumentRead;
pub use tree::{NodeId, Tree, TreeError};
pub use walk::{
    BlockTags, clean_text, closest_block_ancestor, is_inside_overlay, position_cmp, span_text,
};
