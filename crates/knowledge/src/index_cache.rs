//! Opt-in reuse of the built index between queries.
//!
//! The cached index is keyed by a checksum of the full corpus plus the
//! chunking and embedding settings, so any record edit, addition or removal
//! forces a rebuild.

use crate::config::EngineConfig;
use crate::types::Record;
use crate::vector_index::FlatIndex;
use sha2::{Digest, Sha256};
use std::sync::{Arc, RwLock};

/// SHA-256 over every record and the settings that shape the index.
pub fn corpus_checksum(records: &[Record], config: &EngineConfig) -> String {
    let mut hasher = Sha256::new();

    hasher.update(format!(
        "window={};overlap={};model={}:{}\n",
        config.window_size, config.overlap, config.embedding.provider, config.embedding.model
    ));

    for record in records {
        // Length-prefixed fields so adjacent fields cannot run together
        for field in [
            record.id.as_str(),
            record.title.as_str(),
            record.body.as_str(),
            record.category.as_str(),
        ] {
            hasher.update((field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }

        let created = record
            .created_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        hasher.update((created.len() as u64).to_le_bytes());
        hasher.update(created.as_bytes());
    }

    format!("{:x}", hasher.finalize())
}

/// Last built index and the checksum it was built from.
#[derive(Debug, Default)]
pub struct IndexCache {
    slot: RwLock<Option<(String, Arc<FlatIndex>)>>,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached index if it was built from `checksum`.
    pub fn get(&self, checksum: &str) -> Option<Arc<FlatIndex>> {
        let slot = self
            .slot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match slot.as_ref() {
            Some((cached, index)) if cached == checksum => Some(Arc::clone(index)),
            _ => None,
        }
    }

    /// Replace the cached index.
    pub fn store(&self, checksum: String, index: Arc<FlatIndex>) {
        let mut slot = self
            .slot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some((checksum, index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Record> {
        vec![
            Record::new("a", "Food Drive", "Cans"),
            Record::new("b", "Lost Cat", "Orange tabby"),
        ]
    }

    #[test]
    fn test_checksum_is_stable() {
        let config = EngineConfig::default();
        assert_eq!(
            corpus_checksum(&records(), &config),
            corpus_checksum(&records(), &config)
        );
        assert_eq!(corpus_checksum(&records(), &config).len(), 64);
    }

    #[test]
    fn test_checksum_tracks_edits_and_settings() {
        let config = EngineConfig::default();
        let base = corpus_checksum(&records(), &config);

        let mut edited = records();
        edited[1].body = "Found!".to_string();
        assert_ne!(base, corpus_checksum(&edited, &config));

        let mut shorter = records();
        shorter.pop();
        assert_ne!(base, corpus_checksum(&shorter, &config));

        let mut tuned = EngineConfig::default();
        tuned.window_size = 100;
        assert_ne!(base, corpus_checksum(&records(), &tuned));
    }

    #[test]
    fn test_checksum_field_boundaries() {
        let config = EngineConfig::default();
        let a = vec![Record::new("a", "ab", "c")];
        let b = vec![Record::new("a", "a", "bc")];
        assert_ne!(corpus_checksum(&a, &config), corpus_checksum(&b, &config));
    }

    #[test]
    fn test_cache_hit_and_miss() {
        let cache = IndexCache::new();
        assert!(cache.get("abc").is_none());

        let index = Arc::new(FlatIndex::default());
        cache.store("abc".to_string(), Arc::clone(&index));

        assert!(Arc::ptr_eq(&cache.get("abc").unwrap(), &index));
        assert!(cache.get("def").is_none());

        let rebuilt = Arc::new(FlatIndex::default());
        cache.store("def".to_string(), Arc::clone(&rebuilt));
        assert!(cache.get("abc").is_none());
        assert!(Arc::ptr_eq(&cache.get("def").unwrap(), &rebuilt));
    }
}
