//! Inspect command handler.
//!
//! Reports what a query would index: records, chunks and the corpus
//! checksum, optionally building the index to check the embedding service.

use super::{build_engine, open_corpus, resolve_engine_config};
use bulletin_core::{config::AppConfig, AppResult};
use bulletin_knowledge::{chunk_records, corpus_checksum, Corpus, VectorIndex};
use bulletin_prompt::list_prompts;
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Show corpus and index statistics
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// JSON Lines corpus (default: .bulletin/corpus.jsonl)
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Embed every chunk and report the built index
    #[arg(long)]
    pub embed: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CorpusReport {
    records: usize,
    chunks: usize,
    categories: BTreeMap<String, usize>,
    checksum: String,
    window_size: usize,
    overlap: usize,
    embedding_provider: String,
    embedding_model: String,
    prompt_overrides: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_dimensions: Option<usize>,
}

impl InspectCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let report = self.report(config).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!("Records:   {}", report.records);
        println!(
            "Chunks:    {} (window {}, overlap {})",
            report.chunks, report.window_size, report.overlap
        );
        println!(
            "Embedding: {} / {}",
            report.embedding_provider, report.embedding_model
        );
        if let Some(dims) = report.index_dimensions {
            println!("Index:     {} dimensions", dims);
        }
        println!("Checksum:  {}", report.checksum);
        if !report.prompt_overrides.is_empty() {
            println!("Prompts:   {}", report.prompt_overrides.join(", "));
        }
        if !report.categories.is_empty() {
            println!("Categories:");
            for (category, count) in &report.categories {
                println!("  {:<20} {}", category, count);
            }
        }

        Ok(())
    }

    async fn report(&self, config: &AppConfig) -> AppResult<CorpusReport> {
        let engine_config = resolve_engine_config(config)?;
        let corpus = Arc::new(open_corpus(config, self.corpus.as_deref())?);
        let records = corpus.list_all().await?;

        let chunks = chunk_records(&records, engine_config.window_size, engine_config.overlap);

        let mut categories = BTreeMap::new();
        for record in &records {
            let key = if record.category.is_empty() {
                "(none)".to_string()
            } else {
                record.category.clone()
            };
            *categories.entry(key).or_insert(0) += 1;
        }

        let mut report = CorpusReport {
            records: records.len(),
            chunks: chunks.len(),
            categories,
            checksum: corpus_checksum(&records, &engine_config),
            window_size: engine_config.window_size,
            overlap: engine_config.overlap,
            embedding_provider: engine_config.embedding.provider.clone(),
            embedding_model: engine_config.embedding.model.clone(),
            prompt_overrides: list_prompts(&config.workspace)?,
            index_dimensions: None,
        };

        if self.embed {
            tracing::info!("Embedding {} chunks", report.chunks);
            let engine = build_engine(config, engine_config, corpus)?;
            let snapshot = engine.build_index().await?;
            report.index_dimensions = snapshot.index.dimensions();
        }

        Ok(report)
    }
}
