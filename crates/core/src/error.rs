//! Error types for the Bulletin query engine.
//!
//! This module defines a unified error enum that covers every failure the
//! engine can report: configuration, I/O, the corpus collaborator, the
//! embedding and generation services, prompts, and the aggregated
//! `QueryFailed` outcome returned to callers of the query pipeline.

use thiserror::Error;

/// Unified error type for the Bulletin workspace.
///
/// All fallible functions return `Result<T, AppError>`.
/// External-capability failures are wrapped into [`AppError::QueryFailed`]
/// by the pipeline before they reach the caller.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The corpus collaborator could not list or look up records
    #[error("Corpus unavailable: {0}")]
    Corpus(String),

    /// Embedding service transport, quota or contract failures
    #[error("Embedding service error: {0}")]
    Embedding(String),

    /// Generation service errors
    #[error("Generation service error: {0}")]
    Llm(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Follow-up output that could not be turned into questions.
    /// Never aborts a query.
    #[error("Malformed follow-up output: {0}")]
    MalformedFollowup(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A query pipeline failed at the named stage
    #[error("Query failed during {stage}: {source}")]
    QueryFailed {
        stage: &'static str,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Wrap an error as the outcome of a failed query at `stage`.
    ///
    /// Errors that are already `QueryFailed` are returned unchanged so the
    /// innermost stage wins.
    pub fn query_failed(stage: &'static str, cause: AppError) -> Self {
        match cause {
            AppError::QueryFailed { .. } => cause,
            other => AppError::QueryFailed {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Whether this error is (or wraps) a failure of an external service.
    pub fn is_external(&self) -> bool {
        match self {
            AppError::Corpus(_) | AppError::Embedding(_) | AppError::Llm(_) => true,
            AppError::QueryFailed { source, .. } => source.is_external(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_failed_wraps_cause() {
        let err = AppError::query_failed("embedding", AppError::Embedding("quota".to_string()));

        assert_eq!(
            err.to_string(),
            "Query failed during embedding: Embedding service error: quota"
        );
        assert!(err.is_external());
    }

    #[test]
    fn test_query_failed_keeps_innermost_stage() {
        let inner = AppError::query_failed("retrieving", AppError::Embedding("bad".to_string()));
        let outer = AppError::query_failed("done", inner);

        match outer {
            AppError::QueryFailed { stage, .. } => assert_eq!(stage, "retrieving"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_serde_json_conversion() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
        assert!(!err.is_external());
    }
}
