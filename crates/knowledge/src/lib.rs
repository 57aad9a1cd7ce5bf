//! Retrieval-augmented query engine for a community bulletin board.
//!
//! Every query rebuilds an in-memory index from the current corpus (or
//! reuses a cached one when the corpus checksum is unchanged), retrieves the
//! closest chunks, and asks a generation service for a grounded answer plus
//! suggested follow-up questions.
//!
//! # Example
//! ```no_run
//! use bulletin_knowledge::{EngineConfig, Embedder, InMemoryCorpus, QueryEngine, Record};
//! use bulletin_llm::OllamaClient;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let corpus = Arc::new(InMemoryCorpus::new(vec![Record::new(
//!     "a",
//!     "Food Drive",
//!     "Drop off cans Saturday.",
//! )]));
//! let config = EngineConfig::default();
//! let embedder = Embedder::from_config(&config.embedding)?;
//!
//! let engine = QueryEngine::new(corpus, embedder, Arc::new(OllamaClient::new()), config)?;
//! let response = engine.answer_community_query("When is the food drive?").await?;
//! println!("{}", response.answer_text);
//! # Ok(())
//! # }
//! ```

pub mod chunker;
pub mod config;
pub mod corpus;
pub mod embeddings;
pub mod index_cache;
pub mod rag;
pub mod types;
pub mod vector_index;


pub use chunker::{chunk_record, chunk_records};
pub use config::{EmbeddingConfig, EngineConfig};
pub use corpus::{Corpus, InMemoryCorpus, JsonlCorpus};
pub use embeddings::{create_provider, Embedder, EmbeddingProvider};
pub use index_cache::{corpus_checksum, IndexCache};
pub use rag::{IndexSnapshot, QueryEngine, QueryStage};
pub use types::{Chunk, EmbeddedChunk, QueryResponse, Record, RetrievalResult, ScoredChunk};
pub use vector_index::{cosine_similarity, FlatIndex, VectorIndex};
