//! Query engine type definitions.
//!
//! Data flows through the pipeline as plain values:
//! `Record → Chunk → EmbeddedChunk → ScoredChunk → QueryResponse`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A corpus item supplied by the data store.
///
/// The authoritative copy lives in the corpus collaborator; the engine only
/// ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Opaque stable identifier
    pub id: String,

    /// Post title
    pub title: String,

    /// Post body
    #[serde(default, alias = "content")]
    pub body: String,

    /// Board category (e.g., "events", "lost-and-found")
    #[serde(default)]
    pub category: String,

    /// When the record was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Create a record with an empty category and no timestamp.
    pub fn new(id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            category: String::new(),
            created_at: None,
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the creation timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// The text that gets chunked and embedded: title and body on separate
    /// lines, or the title alone when the body is blank.
    pub fn indexed_text(&self) -> String {
        if self.body.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{}\n{}", self.title, self.body)
        }
    }
}

/// A bounded text window derived from one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Window text
    pub text: String,

    /// Record this window was cut from
    pub source_record_id: String,

    /// Position within the record's chunk sequence
    pub sequence_index: u32,

    /// First character (inclusive) in the record's indexed text
    pub start: usize,

    /// Last character (exclusive) in the record's indexed text
    pub end: usize,
}

impl Chunk {
    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.end - self.start
    }
}

/// A chunk with its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,

    /// Embedding vector
    pub vector: Vec<f32>,

    /// Embedding model that produced `vector`
    pub model: Arc<str>,
}

/// One retrieval hit.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: EmbeddedChunk,

    /// Cosine similarity to the query vector
    pub score: f32,
}

impl ScoredChunk {
    /// Id of the record the hit came from.
    pub fn source_record_id(&self) -> &str {
        &self.chunk.chunk.source_record_id
    }

    /// Hit text.
    pub fn text(&self) -> &str {
        &self.chunk.chunk.text
    }
}

/// Top-k hits ordered by descending score.
pub type RetrievalResult = Vec<ScoredChunk>;

/// Everything the caller gets back from one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// Grounded answer, never empty
    pub answer_text: String,

    /// Suggested next questions, possibly empty
    pub suggested_questions: Vec<String>,

    /// Current state of the records that informed the answer, one per id
    pub retrieved_records: Vec<Record>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_indexed_text_joins_title_and_body() {
        let record = Record::new("a", "Food Drive", "Drop off cans Saturday.");
        assert_eq!(record.indexed_text(), "Food Drive\nDrop off cans Saturday.");
    }

    #[test]
    fn test_indexed_text_blank_body_is_title() {
        let record = Record::new("a", "Food Drive", "   ");
        assert_eq!(record.indexed_text(), "Food Drive");
    }

    #[test]
    fn test_record_json_shape() {
        let created = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let record = Record::new("a", "Food Drive", "Cans")
            .with_category("events")
            .with_created_at(created);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["createdAt"], "2025-03-01T12:00:00Z");
        assert_eq!(json["category"], "events");
    }

    #[test]
    fn test_record_accepts_content_alias() {
        let record: Record =
            serde_json::from_str(r#"{"id":"p1","title":"Lost Cat","content":"Orange tabby"}"#)
                .unwrap();
        assert_eq!(record.body, "Orange tabby");
        assert_eq!(record.category, "");
        assert!(record.created_at.is_none());
    }

    #[test]
    fn test_query_response_serializes_camel_case() {
        let response = QueryResponse {
            answer_text: "Saturday".to_string(),
            suggested_questions: vec!["Where?".to_string()],
            retrieved_records: vec![],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["answerText"], "Saturday");
        assert_eq!(json["suggestedQuestions"][0], "Where?");
        assert!(json["retrievedRecords"].as_array().unwrap().is_empty());
    }
}
