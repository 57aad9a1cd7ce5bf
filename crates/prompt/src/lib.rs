//! Prompt system for the Bulletin query engine.
//!
//! This crate provides structured prompt management with:
//! - Built-in definitions for the answer and follow-up generation calls
//! - YAML overrides under `.bulletin/prompts/`
//! - Handlebars template rendering

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{builtin_prompt, list_prompts, load_prompt, ANSWER_PROMPT_ID, FOLLOWUP_PROMPT_ID};
pub use types::{BuiltPrompt, PromptDefinition};
