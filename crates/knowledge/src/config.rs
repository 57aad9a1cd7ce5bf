//! Query engine configuration management.

use bulletin_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Embedding settings for index building and query embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "ollama" or "mock"
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// Model identifier (provider-specific)
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding vector dimensions
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Texts per embedding request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Embedding requests in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Provider endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_embedding_provider() -> String {
    "ollama".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_dimensions() -> usize {
    768
}

fn default_batch_size() -> usize {
    64
}

fn default_concurrency() -> usize {
    4
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            dimensions: default_dimensions(),
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
            endpoint: None,
            timeout_secs: None,
        }
    }
}

/// Tuning surface of the query pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Chunk window in characters
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Characters shared by consecutive chunks of one record
    #[serde(default = "default_overlap")]
    pub overlap: usize,

    /// Chunks retrieved per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Context budget in characters
    #[serde(default = "default_max_context_size")]
    pub max_context_size: usize,

    /// Generation model name
    #[serde(default = "default_generation_model")]
    pub generation_model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Reuse the built index while the corpus checksum is unchanged
    #[serde(default)]
    pub cache_index: bool,

    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

fn default_window_size() -> usize {
    300
}

fn default_overlap() -> usize {
    50
}

fn default_top_k() -> usize {
    4
}

fn default_max_context_size() -> usize {
    4000
}

fn default_generation_model() -> String {
    "llama3.2".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            overlap: default_overlap(),
            top_k: default_top_k(),
            max_context_size: default_max_context_size(),
            generation_model: default_generation_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            cache_index: false,
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load engine configuration from `.bulletin/engine.yaml`, falling back
    /// to defaults when the file does not exist.
    pub fn load(workspace: &Path) -> AppResult<Self> {
        let config_path = get_config_path(workspace);

        if !config_path.exists() {
            tracing::debug!("No engine config at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| {
            AppError::Config(format!("Failed to read config at {:?}: {}", config_path, e))
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse config at {:?}: {}", config_path, e))
        })?;

        tracing::debug!("Loaded engine config from {:?}", config_path);
        Ok(config)
    }

    /// Save engine configuration to `.bulletin/engine.yaml`.
    pub fn save(&self, workspace: &Path) -> AppResult<()> {
        let config_path = get_config_path(workspace);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let yaml = serde_yaml::to_string(self)?;

        fs::write(&config_path, yaml).map_err(|e| {
            AppError::Config(format!("Failed to write config to {:?}: {}", config_path, e))
        })?;

        tracing::debug!("Saved engine config to {:?}", config_path);
        Ok(())
    }

    /// Check parameter constraints once, up front.
    pub fn validate(&self) -> AppResult<()> {
        if self.window_size == 0 {
            return Err(AppError::Config("window_size must be positive".to_string()));
        }

        if self.overlap >= self.window_size {
            return Err(AppError::Config(format!(
                "overlap ({}) must be smaller than window_size ({})",
                self.overlap, self.window_size
            )));
        }

        if self.embedding.batch_size == 0 {
            return Err(AppError::Config(
                "embedding.batch_size must be positive".to_string(),
            ));
        }

        if self.embedding.concurrency == 0 {
            return Err(AppError::Config(
                "embedding.concurrency must be positive".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::Config(format!(
                "temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }

        Ok(())
    }
}

/// Path of the engine config file.
pub fn get_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".bulletin").join("engine.yaml")
}
