//! Corpus collaborator: the read-only source of records.
//!
//! The engine never mutates the corpus. Every query reads the current state,
//! so records added or edited between queries are picked up immediately.

use crate::types::Record;
use async_trait::async_trait;
use bulletin_core::{AppError, AppResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Read access to the record store.
#[async_trait]
pub trait Corpus: Send + Sync {
    /// Every record currently in the store, in store order.
    async fn list_all(&self) -> AppResult<Vec<Record>>;

    /// Records whose id appears in `ids`. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Record>>;
}

/// Corpus held in memory.
#[derive(Debug, Default)]
pub struct InMemoryCorpus {
    records: RwLock<Vec<Record>>,
}

impl InMemoryCorpus {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Insert a record, replacing any record with the same id in place.
    pub fn upsert(&self, record: Record) {
        let mut records = self
            .records
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
    }

    /// Remove a record. Returns whether it existed.
    pub fn remove(&self, id: &str) -> bool {
        let mut records = self
            .records
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let before = records.len();
        records.retain(|r| r.id != id);
        records.len() != before
    }

    fn snapshot(&self) -> Vec<Record> {
        self.records
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Corpus for InMemoryCorpus {
    async fn list_all(&self) -> AppResult<Vec<Record>> {
        Ok(self.snapshot())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Record>> {
        Ok(select_by_ids(self.snapshot(), ids))
    }
}

/// Corpus backed by a JSON Lines file, one record per line.
///
/// The file is re-read on every call.
#[derive(Debug, Clone)]
pub struct JsonlCorpus {
    path: PathBuf,
}

impl JsonlCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_records(&self) -> AppResult<Vec<Record>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AppError::Corpus(format!("Failed to read corpus at {:?}: {}", self.path, e))
        })?;

        let mut records = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let record: Record = serde_json::from_str(line).map_err(|e| {
                AppError::Corpus(format!(
                    "Invalid record on line {} of {:?}: {}",
                    line_no + 1,
                    self.path,
                    e
                ))
            })?;
            records.push(record);
        }

        tracing::debug!("Read {} records from {:?}", records.len(), self.path);
        Ok(records)
    }
}

#[async_trait]
impl Corpus for JsonlCorpus {
    async fn list_all(&self) -> AppResult<Vec<Record>> {
        self.read_records().await
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Record>> {
        Ok(select_by_ids(self.read_records().await?, ids))
    }
}

/// Keep the records whose id is in `ids`, at most one per id.
fn select_by_ids(records: Vec<Record>, ids: &[String]) -> Vec<Record> {
    let mut by_id: HashMap<String, Record> = HashMap::new();
    for record in records {
        if ids.contains(&record.id) {
            by_id.entry(record.id.clone()).or_insert(record);
        }
    }

    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}
