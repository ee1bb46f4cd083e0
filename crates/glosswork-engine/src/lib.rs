pub mod dom;
pub mod selection;

// Re-export key types for easier usage
pub use dom::{DocumentRead, NodeId, Tree, TreeError};
pub use selection::{
    Anchor, AnchorRegistry, BoundaryClassification, ExtractedContext, ExtractionOptions, Locator,
    Span, SpanKind, adjust_selection_range, classify, expand_to_word_boundaries, extract_context,
    find_overlapping, split_by_blocks, trim_boundary_whitespace,
};
