use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::traits::DocumentRead;
use crate::dom::walk::{self, char_len, char_slice, clean_text};
use crate::selection::options::ExtractionOptions;
use crate::selection::span::Span;

/// Everything a translation request needs to know around one selection.
///
/// All strings are overlay-excluded and whitespace-collapsed. `leading_text`
/// and `trailing_text` run from the enclosing block's edges to the span;
/// `current_sentence` is the minimal terminator-to-terminator stretch
/// containing the selection; the sentence lists walk outward from it, in
/// document order, each retaining its terminator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedContext {
    pub text: String,
    pub leading_text: String,
    pub trailing_text: String,
    pub current_sentence: String,
    pub previous_sentences: Vec<String>,
    pub next_sentences: Vec<String>,
}

/// Extract sentence-level context around `span`, scoped to its block.
///
/// The scope is the closest block ancestor (per `options.boundary_tags`)
/// common to both endpoints; a span that already crosses block boundaries
/// falls back to the lowest common ancestor and passes through concatenated
/// rather than being rejected. Reads live tree state: call this *before*
/// wrapping the selection in any new markup.
///
/// Never fails: an invalid or unreadable span yields an all-empty context.
pub fn extract_context<D: DocumentRead>(
    doc: &D,
    span: &Span<D::Node>,
    options: &ExtractionOptions,
) -> ExtractedContext {
    let (Some(start), Some(end)) = (
        walk::resolve_start(doc, &span.start),
        walk::resolve_end(doc, &span.end),
    ) else {
        debug!("extract: unresolvable span endpoints, returning empty context");
        return ExtractedContext::default();
    };

    let start_block = walk::closest_block_ancestor(doc, start.node, &options.boundary_tags);
    let end_block = walk::closest_block_ancestor(doc, end.node, &options.boundary_tags);
    let scope = if start_block == end_block {
        start_block
    } else {
        // Cross-block selection: widen to whatever contains both sides.
        match walk::lowest_common_ancestor(doc, start_block, end_block) {
            Some(lca) => lca,
            None => {
                debug!("extract: endpoints share no ancestor, returning empty context");
                return ExtractedContext::default();
            }
        }
    };

    let nodes = walk::text_nodes_in(doc, scope);
    let (Some(si), Some(ei)) = (
        nodes.iter().position(|n| *n == start.node),
        nodes.iter().position(|n| *n == end.node),
    ) else {
        debug!("extract: span endpoints not inside scope, returning empty context");
        return ExtractedContext::default();
    };
    if si > ei {
        return ExtractedContext::default();
    }

    // Raw scope text in three pieces: before / selection / after.
    let mut raw_before = String::new();
    let mut raw_selection = String::new();
    let mut raw_after = String::new();
    for (index, node) in nodes.iter().enumerate() {
        let Some(text) = doc.text(*node) else {
            continue;
        };
        if index < si {
            raw_before.push_str(text);
        } else if index > ei {
            raw_after.push_str(text);
        } else {
            let from = if index == si { start.offset } else { 0 };
            let to = if index == ei { end.offset } else { char_len(text) };
            if index == si {
                raw_before.push_str(&char_slice(text, 0, from));
            }
            raw_selection.push_str(&char_slice(text, from, to));
            if index == ei {
                raw_after.push_str(&char_slice(text, to, char_len(text)));
            }
        }
    }

    let text = clean_text(&raw_selection);
    let leading_text = clean_text(&raw_before);
    let trailing_text = clean_text(&raw_after);
    if text.trim().is_empty() && leading_text.trim().is_empty() && trailing_text.trim().is_empty() {
        return ExtractedContext::default();
    }

    // The current sentence reaches from the terminator before the selection
    // to the terminator after it (or the scope edges).
    let lead_chars: Vec<char> = leading_text.chars().collect();
    let trail_chars: Vec<char> = trailing_text.chars().collect();

    let last_term = lead_chars.iter().rposition(|c| options.is_terminator(*c));
    let first_term = trail_chars.iter().position(|c| options.is_terminator(*c));

    let sentence_lead: String = match last_term {
        Some(index) => lead_chars[index + 1..].iter().collect(),
        None => leading_text.clone(),
    };
    let sentence_trail: String = match first_term {
        Some(index) => trail_chars[..=index].iter().collect(),
        None => trailing_text.clone(),
    };
    let current_sentence = format!("{sentence_lead}{text}{sentence_trail}")
        .trim()
        .to_string();

    let before_region: String = match last_term {
        Some(index) => lead_chars[..=index].iter().collect(),
        None => String::new(),
    };
    let mut previous_sentences = split_sentences(&before_region, options);
    if previous_sentences.len() > options.prev_count {
        previous_sentences.drain(..previous_sentences.len() - options.prev_count);
    }

    let after_region: String = match first_term {
        Some(index) => trail_chars[index + 1..].iter().collect(),
        None => String::new(),
    };
    let mut next_sentences = split_sentences(&after_region, options);
    next_sentences.truncate(options.next_count);

    ExtractedContext {
        text,
        leading_text,
        trailing_text,
        current_sentence,
        previous_sentences,
        next_sentences,
    }
}

/// Split cleaned text into sentences, each retaining its terminator.
///
/// A trailing stretch without a terminator still counts as a sentence (it is
/// bounded by the block edge instead). Whitespace-only segments are dropped.
fn split_sentences(text: &str, options: &ExtractionOptions) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        current.push(ch);
        if options.is_terminator(ch) {
            push_sentence(&mut sentences, &mut current);
        }
    }
    push_sentence(&mut sentences, &mut current);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    current.clear();
}
