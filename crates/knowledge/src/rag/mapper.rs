//! Map used chunks back to the current state of their records.

use crate::corpus::Corpus;
use crate::types::{Record, ScoredChunk};
use bulletin_core::AppResult;
use std::collections::HashSet;

/// Look up the records behind `used_chunks` with one batch call.
///
/// Records come back in first-seen ranking order, at most one per id.
/// Ids the corpus no longer knows are dropped. No chunks means no call.
pub async fn map_to_records(
    corpus: &dyn Corpus,
    used_chunks: &[ScoredChunk],
) -> AppResult<Vec<Record>> {
    let mut seen = HashSet::new();
    let ids: Vec<String> = used_chunks
        .iter()
        .map(|c| c.source_record_id())
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect();

    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let found = corpus.find_by_ids(&ids).await?;

    let mut emitted = HashSet::new();
    let mut records = Vec::with_capacity(ids.len());
    for id in &ids {
        if let Some(record) = found.iter().find(|r| &r.id == id) {
            if emitted.insert(id.as_str()) {
                records.push(record.clone());
            }
        }
    }

    if records.len() < ids.len() {
        tracing::debug!(
            "{} of {} retrieved records no longer resolve",
            ids.len() - records.len(),
            ids.len()
        );
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::tests::CountingCorpus;
    use crate::corpus::InMemoryCorpus;
    use crate::types::{Chunk, EmbeddedChunk};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn scored(record: &str, seq: u32) -> ScoredChunk {
        ScoredChunk {
            chunk: EmbeddedChunk {
                chunk: Chunk {
                    text: String::new(),
                    source_record_id: record.to_string(),
                    sequence_index: seq,
                    start: 0,
                    end: 0,
                },
                vector: vec![1.0],
                model: Arc::from("m"),
            },
            score: 1.0,
        }
    }

    fn corpus() -> CountingCorpus {
        CountingCorpus {
            inner: InMemoryCorpus::new(vec![
                Record::new("a", "Food Drive", "Cans"),
                Record::new("b", "Lost Cat", "Orange tabby"),
            ]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_dedupes_in_ranking_order() {
        let corpus = corpus();
        let used = [scored("b", 0), scored("a", 0), scored("b", 1)];

        let records = map_to_records(&corpus, &used).await.unwrap();

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(corpus.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_call() {
        let corpus = corpus();
        let records = map_to_records(&corpus, &[]).await.unwrap();

        assert!(records.is_empty());
        assert_eq!(corpus.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reflects_current_state() {
        let corpus = corpus();
        let used = [scored("a", 0), scored("b", 0)];

        corpus
            .inner
            .upsert(Record::new("a", "Food Drive", "Moved to Sunday"));
        corpus.inner.remove("b");

        let records = map_to_records(&corpus, &used).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].body, "Moved to Sunday");
    }
}
