//! Community query orchestration.
//!
//! One call to [`QueryEngine::answer_community_query`] runs the whole
//! pipeline against the current corpus: chunk, embed, index, retrieve,
//! compose, generate, map back to records and derive follow-ups.

use super::context::{compose, ComposedContext};
use super::followups::derive_followups;
use super::mapper::map_to_records;
use super::types::{GenerationSettings, QueryStage, NO_RESPONSE};
use crate::chunker::chunk_records;
use crate::config::EngineConfig;
use crate::corpus::Corpus;
use crate::embeddings::Embedder;
use crate::index_cache::{corpus_checksum, IndexCache};
use crate::types::{QueryResponse, Record};
use crate::vector_index::{FlatIndex, VectorIndex};
use bulletin_core::{AppError, AppResult};
use bulletin_llm::{LlmClient, LlmRequest};
use bulletin_prompt::{
    build_prompt, builtin_prompt, PromptDefinition, ANSWER_PROMPT_ID, FOLLOWUP_PROMPT_ID,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::Instrument;

/// Index built from one corpus snapshot.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    pub index: Arc<FlatIndex>,
    pub record_count: usize,
    pub checksum: String,
}

/// Answers natural-language questions from the community board.
///
/// The engine holds no per-query state; concurrent queries only share the
/// optional index cache.
pub struct QueryEngine {
    corpus: Arc<dyn Corpus>,
    embedder: Embedder,
    llm: Arc<dyn LlmClient>,
    config: EngineConfig,
    answer_prompt: PromptDefinition,
    followup_prompt: PromptDefinition,
    cache: Option<IndexCache>,
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("llm", &self.llm.provider_name())
            .field("embedder", &self.embedder)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl QueryEngine {
    /// Create an engine with the built-in prompts.
    pub fn new(
        corpus: Arc<dyn Corpus>,
        embedder: Embedder,
        llm: Arc<dyn LlmClient>,
        config: EngineConfig,
    ) -> AppResult<Self> {
        config.validate()?;

        let answer_prompt = builtin_prompt(ANSWER_PROMPT_ID).ok_or_else(|| {
            AppError::Prompt(format!("Missing built-in prompt '{}'", ANSWER_PROMPT_ID))
        })?;
        let followup_prompt = builtin_prompt(FOLLOWUP_PROMPT_ID).ok_or_else(|| {
            AppError::Prompt(format!("Missing built-in prompt '{}'", FOLLOWUP_PROMPT_ID))
        })?;

        let cache = config.cache_index.then(IndexCache::new);

        Ok(Self {
            corpus,
            embedder,
            llm,
            config,
            answer_prompt,
            followup_prompt,
            cache,
        })
    }

    /// Replace the answer and follow-up prompts, e.g. with workspace overrides.
    pub fn with_prompts(mut self, answer: PromptDefinition, followups: PromptDefinition) -> Self {
        self.answer_prompt = answer;
        self.followup_prompt = followups;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            model: self.config.generation_model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }

    /// Load the corpus and build an index from it.
    pub async fn build_index(&self) -> AppResult<IndexSnapshot> {
        stage(QueryStage::LoadingCorpus);
        let records = self
            .corpus
            .list_all()
            .await
            .map_err(|e| AppError::query_failed(QueryStage::LoadingCorpus.as_str(), e))?;

        self.index_records(&records).await
    }

    async fn index_records(&self, records: &[Record]) -> AppResult<IndexSnapshot> {
        let checksum = corpus_checksum(records, &self.config);

        if let Some(cache) = &self.cache {
            if let Some(index) = cache.get(&checksum) {
                tracing::debug!("Reusing cached index ({} chunks)", index.len());
                stage(QueryStage::Indexed);
                return Ok(IndexSnapshot {
                    index,
                    record_count: records.len(),
                    checksum,
                });
            }
        }

        stage(QueryStage::Chunking);
        let chunks = chunk_records(records, self.config.window_size, self.config.overlap);

        stage(QueryStage::Embedding);
        let embedded = self
            .embedder
            .embed_chunks(chunks)
            .await
            .map_err(|e| AppError::query_failed(QueryStage::Embedding.as_str(), e))?;

        let index = FlatIndex::build(embedded)
            .map(Arc::new)
            .map_err(|e| AppError::query_failed(QueryStage::Indexed.as_str(), e))?;
        stage(QueryStage::Indexed);

        if let Some(cache) = &self.cache {
            cache.store(checksum.clone(), Arc::clone(&index));
        }

        Ok(IndexSnapshot {
            index,
            record_count: records.len(),
            checksum,
        })
    }

    /// Answer `question` from the current corpus.
    ///
    /// Any failure of the corpus, embedding or generation service aborts the
    /// query with [`AppError::QueryFailed`] naming the stage. Follow-up
    /// output that cannot be parsed only empties `suggested_questions`.
    pub async fn answer_community_query(&self, question: &str) -> AppResult<QueryResponse> {
        let span = tracing::info_span!("community_query", question_len = question.len());
        self.run_query(question).instrument(span).await
    }

    async fn run_query(&self, question: &str) -> AppResult<QueryResponse> {
        stage(QueryStage::Idle);
        let snapshot = self.build_index().await?;

        stage(QueryStage::Retrieving);
        let query_vector = self
            .embedder
            .embed_query(question)
            .await
            .map_err(|e| AppError::query_failed(QueryStage::Retrieving.as_str(), e))?;
        let retrieved = snapshot
            .index
            .query(&query_vector, self.config.top_k)
            .map_err(|e| AppError::query_failed(QueryStage::Retrieving.as_str(), e))?;

        stage(QueryStage::Composing);
        let context = compose(&retrieved, self.config.max_context_size);
        if context.is_empty() {
            tracing::info!("No context retrieved; answering without posts");
        }

        stage(QueryStage::GeneratingAnswer);
        let answer_text = self
            .generate_answer(question, &context)
            .await
            .map_err(|e| AppError::query_failed(QueryStage::GeneratingAnswer.as_str(), e))?;

        stage(QueryStage::MappingRecords);
        let retrieved_records = map_to_records(self.corpus.as_ref(), &context.used_chunks)
            .await
            .map_err(|e| AppError::query_failed(QueryStage::MappingRecords.as_str(), e))?;

        stage(QueryStage::DerivingFollowups);
        let suggested_questions = derive_followups(
            self.llm.as_ref(),
            &self.followup_prompt,
            &self.generation_settings(),
            &answer_text,
        )
        .await
        .map_err(|e| AppError::query_failed(QueryStage::DerivingFollowups.as_str(), e))?;

        stage(QueryStage::Done);
        tracing::info!(
            "Answered from {} of {} records ({} chunks in context, {} follow-ups)",
            retrieved_records.len(),
            snapshot.record_count,
            context.used_chunks.len(),
            suggested_questions.len()
        );

        Ok(QueryResponse {
            answer_text,
            suggested_questions,
            retrieved_records,
        })
    }

    /// One generation call grounded in `context`.
    async fn generate_answer(&self, question: &str, context: &ComposedContext) -> AppResult<String> {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context.text.clone());
        vars.insert("question".to_string(), question.to_string());
        let built = build_prompt(&self.answer_prompt, vars)?;
        let prompt_id = built.source_prompt_id;

        let settings = self.generation_settings();
        let mut request = LlmRequest::new(built.user, settings.model)
            .with_temperature(settings.temperature)
            .with_max_tokens(settings.max_tokens);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        tracing::debug!(
            "Generating answer with '{}' from prompt '{}' ({} context chars)",
            self.llm.provider_name(),
            prompt_id,
            context.char_len()
        );

        let response = self.llm.complete(&request).await?;
        Ok(normalize_answer(response.content))
    }
}

fn stage(stage: QueryStage) {
    tracing::debug!(stage = stage.as_str(), "query stage");
}

/// Blank output becomes [`NO_RESPONSE`] so callers always get an answer.
fn normalize_answer(content: String) -> String {
    if content.trim().is_empty() {
        NO_RESPONSE.to_string()
    } else {
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_answer() {
        assert_eq!(normalize_answer("  \n".to_string()), NO_RESPONSE);
        assert_eq!(normalize_answer(String::new()), NO_RESPONSE);
        assert_eq!(normalize_answer("Saturday".to_string()), "Saturday");
    }
}
