//! Query pipeline types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Answer text used when the generation service returns nothing.
pub const NO_RESPONSE: &str = "No response.";

/// Stages of one query, in execution order.
///
/// A failure in any stage that talks to an external collaborator aborts the
/// query and is reported with that stage's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStage {
    Idle,
    LoadingCorpus,
    Chunking,
    Embedding,
    Indexed,
    Retrieving,
    Composing,
    GeneratingAnswer,
    MappingRecords,
    DerivingFollowups,
    Done,
}

impl QueryStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStage::Idle => "idle",
            QueryStage::LoadingCorpus => "loading_corpus",
            QueryStage::Chunking => "chunking",
            QueryStage::Embedding => "embedding",
            QueryStage::Indexed => "indexed",
            QueryStage::Retrieving => "retrieving",
            QueryStage::Composing => "composing",
            QueryStage::GeneratingAnswer => "generating_answer",
            QueryStage::MappingRecords => "mapping_records",
            QueryStage::DerivingFollowups => "deriving_followups",
            QueryStage::Done => "done",
        }
    }
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model parameters shared by the answer and follow-up calls.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "llama3.2".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}
