//! Ask command handler.
//!
//! Answers a question from the community board's current posts.

use super::{build_engine, open_corpus, resolve_engine_config};
use bulletin_core::{config::AppConfig, AppError, AppResult};
use bulletin_knowledge::QueryResponse;
use clap::Args;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

/// Ask a question about the community board
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// JSON Lines corpus (default: .bulletin/corpus.jsonl)
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Number of chunks to retrieve
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::debug!("Ask command options: {:?}", self);

        let question = self.question.trim();
        if question.is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        let mut engine_config = resolve_engine_config(config)?;
        if let Some(top_k) = self.top_k {
            engine_config.top_k = top_k;
        }

        let corpus = Arc::new(open_corpus(config, self.corpus.as_deref())?);
        let engine = build_engine(config, engine_config, corpus)?;

        let response = engine.answer_community_query(question).await?;

        if self.json {
            let json = serde_json::to_string_pretty(&response)?;
            println!("{}", json);
        } else {
            print!("{}", render_text(&response));
        }

        Ok(())
    }
}

/// Plain-text rendering: answer, sources, then suggested questions.
fn render_text(response: &QueryResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", response.answer_text.trim_end());

    if !response.retrieved_records.is_empty() {
        let _ = writeln!(out, "\nSources:");
        for record in &response.retrieved_records {
            if record.category.is_empty() {
                let _ = writeln!(out, "  - {} [{}]", record.title, record.id);
            } else {
                let _ = writeln!(
                    out,
                    "  - {} [{}] ({})",
                    record.title, record.id, record.category
                );
            }
        }
    }

    if !response.suggested_questions.is_empty() {
        let _ = writeln!(out, "\nYou might also ask:");
        for question in &response.suggested_questions {
            let _ = writeln!(out, "  - {}", question);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulletin_knowledge::Record;

    #[test]
    fn test_render_text() {
        let response = QueryResponse {
            answer_text: "The food drive is Saturday.".to_string(),
            suggested_questions: vec!["Where do I drop off cans?".to_string()],
            retrieved_records: vec![
                Record::new("a", "Food Drive", "Drop off cans Saturday.").with_category("events")
            ],
        };

        assert_eq!(
            render_text(&response),
            "The food drive is Saturday.\n\nSources:\n  - Food Drive [a] (events)\n\n\
             You might also ask:\n  - Where do I drop off cans?\n"
        );
    }

    #[test]
    fn test_render_text_answer_only() {
        let response = QueryResponse {
            answer_text: "No response.".to_string(),
            suggested_questions: vec![],
            retrieved_records: vec![],
        };

        assert_eq!(render_text(&response), "No response.\n");
    }

    #[tokio::test]
    async fn test_ask_with_mock_providers() {
        let temp = tempfile::TempDir::new().unwrap();
        let corpus = temp.path().join("corpus.jsonl");
        std::fs::write(
            &corpus,
            "{\"id\":\"a\",\"title\":\"Food Drive\",\"body\":\"Drop off cans Saturday.\"}\n",
        )
        .unwrap();

        let config = AppConfig {
            workspace: temp.path().to_path_buf(),
            provider: "mock".to_string(),
            ..Default::default()
        };
        let cmd = AskCommand {
            question: "When is the food drive?".to_string(),
            corpus: Some(corpus),
            top_k: Some(1),
            json: true,
        };

        cmd.execute(&config).await.unwrap();
    }

    #[tokio::test]
    async fn test_blank_question_rejected() {
        let cmd = AskCommand {
            question: "   ".to_string(),
            corpus: None,
            top_k: None,
            json: false,
        };

        let result = cmd.execute(&AppConfig::default()).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
