//! Generation capability for the Bulletin query engine.
//!
//! This crate provides a provider-agnostic abstraction for text generation.
//! The engine talks to an [`LlmClient`]; which model answers is a
//! deployment decision.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//! - **Mock**: Deterministic scripted client for tests and offline runs
//!
//! # Example
//! ```no_run
//! use bulletin_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("When is the food drive?", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{MockClient, OllamaClient};
pub use types::ProviderType;
