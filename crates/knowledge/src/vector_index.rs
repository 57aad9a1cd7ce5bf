//! Vector index over embedded chunks.
//!
//! [`VectorIndex`] is the seam for swapping in an approximate index;
//! [`FlatIndex`] is the exact brute-force implementation used by default.

use crate::types::{EmbeddedChunk, RetrievalResult, ScoredChunk};
use bulletin_core::{AppError, AppResult};
use std::collections::HashMap;

/// Trait for vector index backends.
pub trait VectorIndex: Send + Sync {
    /// Number of indexed chunks.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector dimension shared by every entry, `None` when empty.
    fn dimensions(&self) -> Option<usize>;

    /// Embedding model shared by every entry, `None` when empty.
    fn model(&self) -> Option<&str>;

    /// Top-`k` chunks by descending cosine similarity to `query`.
    fn query(&self, query: &[f32], k: usize) -> AppResult<RetrievalResult>;
}

#[derive(Debug, Clone)]
struct Entry {
    chunk: EmbeddedChunk,
    /// Position of the chunk's record among records, by first appearance
    record_rank: usize,
    /// Insertion position
    position: usize,
}

/// Exact index that scores every entry on each query.
#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    entries: Vec<Entry>,
}

impl FlatIndex {
    /// Build an index, rejecting mixed dimensions or embedding models.
    pub fn build(chunks: Vec<EmbeddedChunk>) -> AppResult<Self> {
        let mut record_ranks: HashMap<String, usize> = HashMap::new();
        let mut entries: Vec<Entry> = Vec::with_capacity(chunks.len());

        for (position, chunk) in chunks.into_iter().enumerate() {
            if let Some(first) = entries.first().map(|e| &e.chunk) {
                if chunk.vector.len() != first.vector.len() {
                    return Err(AppError::Embedding(format!(
                        "Chunk {} of record '{}' has {} dimensions, index has {}",
                        chunk.chunk.sequence_index,
                        chunk.chunk.source_record_id,
                        chunk.vector.len(),
                        first.vector.len()
                    )));
                }
                if chunk.model != first.model {
                    return Err(AppError::Embedding(format!(
                        "Chunk embedded with model '{}' cannot join an index built with '{}'",
                        chunk.model, first.model
                    )));
                }
            }

            let next_rank = record_ranks.len();
            let record_rank = *record_ranks
                .entry(chunk.chunk.source_record_id.clone())
                .or_insert(next_rank);

            entries.push(Entry {
                chunk,
                record_rank,
                position,
            });
        }

        tracing::debug!(
            "Built flat index with {} chunks from {} records",
            entries.len(),
            record_ranks.len()
        );

        Ok(Self { entries })
    }
}

impl VectorIndex for FlatIndex {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn dimensions(&self) -> Option<usize> {
        self.entries.first().map(|e| e.chunk.vector.len())
    }

    fn model(&self) -> Option<&str> {
        self.entries.first().map(|e| &*e.chunk.model)
    }

    fn query(&self, query: &[f32], k: usize) -> AppResult<RetrievalResult> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if let Some(dims) = self.dimensions() {
            if query.len() != dims {
                return Err(AppError::Embedding(format!(
                    "Query vector has {} dimensions, index has {}",
                    query.len(),
                    dims
                )));
            }
        }

        let mut scored: Vec<(f32, &Entry)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(query, &entry.chunk.vector), entry))
            .collect();

        scored.sort_by(|(score_a, a), (score_b, b)| {
            score_b
                .total_cmp(score_a)
                .then_with(|| a.record_rank.cmp(&b.record_rank))
                .then_with(|| a.chunk.chunk.sequence_index.cmp(&b.chunk.chunk.sequence_index))
                .then_with(|| a.position.cmp(&b.position))
        });

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(score, entry)| ScoredChunk {
                chunk: entry.chunk.clone(),
                score,
            })
            .collect())
    }
}

/// Cosine similarity; a zero vector scores 0 against anything.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a * norm_b);
    if similarity.is_nan() {
        return 0.0;
    }
    similarity
}
