//! Context composition under a character budget.

use crate::types::ScoredChunk;
use serde::Serialize;

/// Separator between chunk texts; counts toward the budget.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Where one chunk landed in the composed context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSegment {
    pub source_record_id: String,
    pub sequence_index: u32,
    /// Character offset of the segment in the context text
    pub start: usize,
    /// End character offset (exclusive)
    pub end: usize,
}

/// Context text plus the chunks that went into it.
#[derive(Debug, Clone, Default)]
pub struct ComposedContext {
    pub text: String,
    /// A prefix of the retrieval result, in ranking order
    pub used_chunks: Vec<ScoredChunk>,
    pub segments: Vec<ContextSegment>,
}

impl ComposedContext {
    pub fn is_empty(&self) -> bool {
        self.used_chunks.is_empty()
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.segments.last().map(|s| s.end).unwrap_or(0)
    }
}

/// Concatenate chunk texts in ranking order until the next one would push
/// the context past `max_chars`.
///
/// Chunks are never split. A top chunk longer than the budget on its own is
/// still included so the answer has something to work from.
pub fn compose(retrieved: &[ScoredChunk], max_chars: usize) -> ComposedContext {
    let separator_len = CONTEXT_SEPARATOR.chars().count();
    let mut composed = ComposedContext::default();
    let mut used = 0usize;

    for scored in retrieved {
        let text_len = scored.text().chars().count();
        let start = if composed.is_empty() {
            0
        } else {
            used + separator_len
        };
        let end = start + text_len;

        if end > max_chars && !composed.is_empty() {
            break;
        }

        if !composed.is_empty() {
            composed.text.push_str(CONTEXT_SEPARATOR);
        }
        composed.text.push_str(scored.text());
        composed.segments.push(ContextSegment {
            source_record_id: scored.source_record_id().to_string(),
            sequence_index: scored.chunk.chunk.sequence_index,
            start,
            end,
        });
        composed.used_chunks.push(scored.clone());
        used = end;

        if end > max_chars {
            // Oversized first chunk: nothing else can fit.
            break;
        }
    }

    tracing::debug!(
        "Composed context: {} of {} chunks, {} chars (budget {})",
        composed.used_chunks.len(),
        retrieved.len(),
        used,
        max_chars
    );

    composed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, EmbeddedChunk};
    use std::sync::Arc;

    fn scored(record: &str, text: &str) -> ScoredChunk {
        ScoredChunk {
            chunk: EmbeddedChunk {
                chunk: Chunk {
                    text: text.to_string(),
                    source_record_id: record.to_string(),
                    sequence_index: 0,
                    start: 0,
                    end: text.chars().count(),
                },
                vector: vec![1.0],
                model: Arc::from("m"),
            },
            score: 1.0,
        }
    }

    #[test]
    fn test_joins_with_blank_line() {
        let composed = compose(&[scored("a", "one"), scored("b", "two")], 100);

        assert_eq!(composed.text, "one\n\ntwo");
        assert_eq!(composed.used_chunks.len(), 2);
        assert_eq!(composed.segments[1].start, 5);
        assert_eq!(composed.segments[1].end, 8);
        assert_eq!(composed.char_len(), 8);
    }

    #[test]
    fn test_separator_counts_toward_budget() {
        // "aaaa" + "\n\n" + "bbbb" is 10 chars
        let chunks = [scored("a", "aaaa"), scored("b", "bbbb")];

        assert_eq!(compose(&chunks, 10).used_chunks.len(), 2);
        assert_eq!(compose(&chunks, 9).used_chunks.len(), 1);
    }

    #[test]
    fn test_stops_at_first_overflow() {
        // The third chunk would fit, but composition stops at the second.
        let chunks = [
            scored("a", "aaaa"),
            scored("b", "b".repeat(50).as_str()),
            scored("c", "c"),
        ];
        let composed = compose(&chunks, 10);

        assert_eq!(composed.text, "aaaa");
        assert_eq!(composed.used_chunks.len(), 1);
    }

    #[test]
    fn test_oversized_top_chunk_included_alone() {
        let chunks = [scored("a", &"x".repeat(20)), scored("b", "y")];
        let composed = compose(&chunks, 5);

        assert_eq!(composed.used_chunks.len(), 1);
        assert_eq!(composed.text.chars().count(), 20);
    }

    #[test]
    fn test_empty_input() {
        let composed = compose(&[], 100);
        assert!(composed.is_empty());
        assert!(composed.text.is_empty());
    }

    #[test]
    fn test_segments_carry_provenance() {
        let composed = compose(&[scored("a", "one"), scored("b", "two")], 100);
        let ids: Vec<&str> = composed
            .segments
            .iter()
            .map(|s| s.source_record_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
