//! RAG (Retrieval-Augmented Generation) answering for community questions.
//!
//! Composes retrieved chunks into a bounded context, asks the generation
//! service for a grounded answer, and maps the evidence back to records.

pub mod ask;
pub mod context;
pub mod followups;
pub mod mapper;
pub mod types;

pub use ask::{IndexSnapshot, QueryEngine};
pub use context::{compose, ComposedContext, ContextSegment, CONTEXT_SEPARATOR};
pub use followups::{derive_followups, extract_followups, parse_followups};
pub use mapper::map_to_records;
pub use types::{GenerationSettings, QueryStage, NO_RESPONSE};
