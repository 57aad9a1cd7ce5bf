//! Command handlers for the Bulletin CLI.

pub mod ask;
pub mod inspect;

pub use ask::AskCommand;
pub use inspect::InspectCommand;

use bulletin_core::{config::AppConfig, AppError, AppResult};
use bulletin_knowledge::{Corpus, Embedder, EngineConfig, JsonlCorpus, QueryEngine};
use bulletin_llm::create_client;
use bulletin_prompt::{load_prompt, ANSWER_PROMPT_ID, FOLLOWUP_PROMPT_ID};
use std::path::Path;
use std::sync::Arc;

/// Engine settings for this workspace with the CLI's provider choices applied.
///
/// `AppConfig` decides the generation model and the embedding provider; a
/// provider entry in `config.yaml` may also name the endpoint, timeout and
/// embedding model.
pub(crate) fn resolve_engine_config(config: &AppConfig) -> AppResult<EngineConfig> {
    let mut engine = EngineConfig::load(&config.workspace)?;
    engine.generation_model = config.model.clone();

    let embedding_provider = config.embedding_provider().to_string();
    if let Some(provider) = config.get_provider_config(&embedding_provider) {
        engine.embedding.endpoint = provider.endpoint().map(str::to_string);
        engine.embedding.timeout_secs = provider.timeout_secs();
        if let bulletin_core::config::ProviderConfig::Ollama {
            embedding_model: Some(model),
            ..
        } = provider
        {
            engine.embedding.model = model.clone();
        }
    }
    engine.embedding.provider = embedding_provider;

    engine.validate()?;
    Ok(engine)
}

/// Corpus at `path`, or the workspace default.
pub(crate) fn open_corpus(config: &AppConfig, path: Option<&Path>) -> AppResult<JsonlCorpus> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.default_corpus_path());

    if !path.exists() {
        return Err(AppError::Corpus(format!(
            "No corpus at {:?}. Export the board's posts as JSON Lines or pass --corpus.",
            path
        )));
    }

    Ok(JsonlCorpus::new(path))
}

pub(crate) fn build_embedder(engine: &EngineConfig) -> AppResult<Embedder> {
    Embedder::from_config(&engine.embedding)
}

/// Query engine over `corpus` with the configured providers and any
/// workspace prompt overrides.
pub(crate) fn build_engine(
    config: &AppConfig,
    engine_config: EngineConfig,
    corpus: Arc<dyn Corpus>,
) -> AppResult<QueryEngine> {
    let embedder = build_embedder(&engine_config)?;

    let provider_config = config.get_provider_config(&config.provider);
    let client = create_client(
        &config.provider,
        provider_config.and_then(|p| p.endpoint()),
        provider_config.and_then(|p| p.timeout_secs()),
    )
    .map_err(AppError::Config)?;

    Ok(
        QueryEngine::new(corpus, embedder, client, engine_config)?.with_prompts(
            load_prompt(&config.workspace, ANSWER_PROMPT_ID)?,
            load_prompt(&config.workspace, FOLLOWUP_PROMPT_ID)?,
        ),
    )
}
