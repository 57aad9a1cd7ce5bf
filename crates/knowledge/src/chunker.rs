//! Record chunking with a fixed character window and overlap.

use crate::types::{Chunk, Record};

/// Split a record into overlapping character windows.
///
/// The window advances by `window_size - overlap` until the rest of the text
/// fits in one window, which becomes the last (possibly shorter) chunk.
/// Every record yields at least one chunk, so a record with empty text still
/// produces a single empty chunk. Text is never trimmed, which keeps the
/// `start..end` offsets exact.
///
/// Callers guarantee `overlap < window_size`; see
/// [`EngineConfig::validate`](crate::config::EngineConfig::validate).
pub fn chunk_record(record: &Record, window_size: usize, overlap: usize) -> Vec<Chunk> {
    let chars: Vec<char> = record.indexed_text().chars().collect();
    let window = window_size.max(1);
    let step = window.saturating_sub(overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0usize;

    loop {
        let end = (start + window).min(chars.len());

        chunks.push(Chunk {
            text: chars[start..end].iter().collect(),
            source_record_id: record.id.clone(),
            sequence_index: chunks.len() as u32,
            start,
            end,
        });

        if end == chars.len() {
            break;
        }
        start += step;
    }

    tracing::trace!(
        "Chunked record '{}' into {} chunks (window: {}, overlap: {})",
        record.id,
        chunks.len(),
        window_size,
        overlap
    );

    chunks
}

/// Chunk every record, preserving corpus order.
pub fn chunk_records(records: &[Record], window_size: usize, overlap: usize) -> Vec<Chunk> {
    let chunks: Vec<Chunk> = records
        .iter()
        .flat_map(|record| chunk_record(record, window_size, overlap))
        .collect();

    tracing::debug!(
        "Chunked {} records into {} chunks",
        records.len(),
        chunks.len()
    );

    chunks
}
