//! Embedding stage of the query pipeline.
//!
//! [`Embedder`] wraps a provider with batching, bounded concurrency and
//! response checks, so the rest of the pipeline can rely on one vector of
//! the configured dimension per input, in input order.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};

use crate::config::EmbeddingConfig;
use crate::types::{Chunk, EmbeddedChunk};
use bulletin_core::{AppError, AppResult};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;

/// Batching front end for an [`EmbeddingProvider`].
#[derive(Debug, Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
    concurrency: usize,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, batch_size: usize, concurrency: usize) -> Self {
        Self {
            provider,
            batch_size: batch_size.max(1),
            concurrency: concurrency.max(1),
        }
    }

    /// Build the provider described by `config` and wrap it.
    pub fn from_config(config: &EmbeddingConfig) -> AppResult<Self> {
        let provider = create_provider(config)?;
        Ok(Self::new(provider, config.batch_size, config.concurrency))
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Model identity stamped on every embedded chunk.
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    pub fn dimensions(&self) -> usize {
        self.provider.dimensions()
    }

    /// Embed texts in batches, with at most `concurrency` batches in flight.
    ///
    /// Output order matches input order.
    pub async fn embed_texts(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            "Embedding {} texts using provider '{}' (model: {}, batch size: {}, concurrency: {})",
            texts.len(),
            self.provider.provider_name(),
            self.provider.model_name(),
            self.batch_size,
            self.concurrency
        );

        let batches: Vec<Vec<Vec<f32>>> = stream::iter(texts.chunks(self.batch_size))
            .map(|batch| self.embed_checked(batch))
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        Ok(batches.into_iter().flatten().collect())
    }

    async fn embed_checked(&self, batch: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let vectors = self.provider.embed_batch(batch).await?;

        if vectors.len() != batch.len() {
            return Err(AppError::Embedding(format!(
                "Provider '{}' returned {} embeddings for {} inputs",
                self.provider.provider_name(),
                vectors.len(),
                batch.len()
            )));
        }

        let expected = self.provider.dimensions();
        if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
            return Err(AppError::Embedding(format!(
                "Provider '{}' returned a {}-dim embedding, expected {}",
                self.provider.provider_name(),
                bad.len(),
                expected
            )));
        }

        Ok(vectors)
    }

    /// Embed chunks, pairing each with its vector and the model identity.
    pub async fn embed_chunks(&self, chunks: Vec<Chunk>) -> AppResult<Vec<EmbeddedChunk>> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embed_texts(&texts).await?;
        let model: Arc<str> = Arc::from(self.model_name());

        Ok(chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| EmbeddedChunk {
                chunk,
                vector,
                model: Arc::clone(&model),
            })
            .collect())
    }

    /// Embed a question with the same model used for the index.
    pub async fn embed_query(&self, question: &str) -> AppResult<Vec<f32>> {
        let mut vectors = self.embed_texts(&[question.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned for query".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::mock::MockProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider that records batch sizes and can misbehave on demand.
    #[derive(Debug, Default)]
    struct ScriptedProvider {
        calls: AtomicUsize,
        drop_one: bool,
        wrong_dims: bool,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for ScriptedProvider {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        fn model_name(&self) -> &str {
            "scripted-v1"
        }

        fn dimensions(&self) -> usize {
            2
        }

        async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::Embedding("service down".to_string()));
            }

            let dims = if self.wrong_dims { 3 } else { 2 };
            let mut out: Vec<Vec<f32>> = texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0; dims];
                    v[0] = t.len() as f32;
                    v
                })
                .collect();
            if self.drop_one {
                out.pop();
            }
            Ok(out)
        }
    }

    fn texts(n: usize) -> Vec<String> {
        (1..=n).map(|i| "x".repeat(i)).collect()
    }

    #[tokio::test]
    async fn test_batches_preserve_order() {
        let provider = Arc::new(ScriptedProvider::default());
        let embedder = Embedder::new(provider.clone(), 2, 3);

        let vectors = embedder.embed_texts(&texts(5)).await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        let firsts: Vec<f32> = vectors.iter().map(|v| v[0]).collect();
        assert_eq!(firsts, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[tokio::test]
    async fn test_count_mismatch_rejected() {
        let provider = Arc::new(ScriptedProvider {
            drop_one: true,
            ..Default::default()
        });
        let embedder = Embedder::new(provider, 10, 1);

        let result = embedder.embed_texts(&texts(3)).await;
        assert!(matches!(result, Err(AppError::Embedding(_))));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let provider = Arc::new(ScriptedProvider {
            wrong_dims: true,
            ..Default::default()
        });
        let embedder = Embedder::new(provider, 10, 1);

        let result = embedder.embed_query("hello").await;
        assert!(matches!(result, Err(AppError::Embedding(_))));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = Arc::new(ScriptedProvider {
            fail: true,
            ..Default::default()
        });
        let embedder = Embedder::new(provider, 10, 1);

        let err = embedder.embed_texts(&texts(2)).await.unwrap_err();
        assert!(err.to_string().contains("service down"));
    }

    #[tokio::test]
    async fn test_empty_input_skips_provider() {
        let provider = Arc::new(ScriptedProvider::default());
        let embedder = Embedder::new(provider.clone(), 10, 1);

        assert!(embedder.embed_texts(&[]).await.unwrap().is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_embed_chunks_stamps_model() {
        let embedder = Embedder::new(Arc::new(MockProvider::new(32)), 64, 4);
        let chunk = Chunk {
            text: "Food Drive".to_string(),
            source_record_id: "a".to_string(),
            sequence_index: 0,
            start: 0,
            end: 10,
        };

        let embedded = embedder.embed_chunks(vec![chunk]).await.unwrap();
        assert_eq!(embedded.len(), 1);
        assert_eq!(&*embedded[0].model, "trigram-v1");
        assert_eq!(embedded[0].vector.len(), 32);
    }
}
