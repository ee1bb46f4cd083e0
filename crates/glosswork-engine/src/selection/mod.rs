/*!
 * # Selection Core
 *
 * Turning a raw user selection into something a translation request can use
 * takes four read-only passes over the document tree, plus one bookkeeping
 * check against previously placed glosses:
 *
 * 1. **Adjust** ([`adjust`]): trim boundary whitespace, then snap a partial
 *    word selection outward to its word boundaries (`"onial"` inside
 *    `"testimonial"` becomes the whole word). Classification ([`classify`])
 *    decides whether a span is a single word or a multi-word fragment and
 *    whether its edges are already linguistically complete.
 * 2. **Split** ([`split`]): a selection dragged across paragraphs or list
 *    items becomes one sub-span per block so each piece can be annotated in
 *    place.
 * 3. **Extract** ([`context`]): the containing sentence plus neighboring
 *    sentences, scoped to the enclosing block, whitespace-collapsed and with
 *    overlay markup excluded. Extraction reads live tree state, so callers
 *    must extract *before* wrapping the selection in any new markup.
 * 4. **Overlap** ([`overlap`]): which existing anchors intersect the new
 *    span, so stale glosses can be cleaned up after inserting a new one.
 *
 * None of these hold state between calls; each is a pure function of the
 * tree and its arguments, and each degrades to an empty/unmodified result
 * instead of failing.
 */

pub mod adjust;
pub mod classify;
pub mod context;
pub mod options;
pub mod overlap;
pub mod span;
pub mod split;

pub use adjust::{
    AdjustOutcome, TrimOutcome, adjust_selection_range, expand_to_word_boundaries,
    trim_boundary_whitespace,
};
pub use classify::{BoundaryClassification, SpanKind, classify, is_boundary_char};
pub use context::{ExtractedContext, extract_context};
pub use options::ExtractionOptions;
pub use overlap::{Anchor, AnchorRegistry, find_overlapping};
pub use span::{Locator, Span};
pub use split::split_by_blocks;
