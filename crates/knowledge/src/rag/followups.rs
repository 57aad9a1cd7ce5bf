//! Suggested follow-up questions.

use super::types::GenerationSettings;
use bulletin_core::{AppError, AppResult};
use bulletin_llm::{LlmClient, LlmRequest};
use bulletin_prompt::{build_prompt, PromptDefinition};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Leading enumeration such as `1.`, `2)` or `3 `.
static ENUMERATION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[).\s]*").unwrap());

/// Turn raw model output into questions, one per non-empty line.
///
/// Lines are trimmed and stripped of a leading enumeration marker. Every
/// non-empty line is kept, however many there are.
pub fn parse_followups(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| ENUMERATION_MARKER.replace(line.trim(), "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Like [`parse_followups`], but output without a single question is
/// [`AppError::MalformedFollowup`].
pub fn extract_followups(output: &str) -> AppResult<Vec<String>> {
    let questions = parse_followups(output);
    if questions.is_empty() {
        return Err(AppError::MalformedFollowup(format!(
            "no questions in {} chars of output",
            output.len()
        )));
    }
    Ok(questions)
}

/// Ask the generation service for follow-up questions about `answer`.
///
/// A transport failure is returned to the caller. Output that yields no
/// questions degrades to an empty list.
pub async fn derive_followups(
    llm: &dyn LlmClient,
    prompt: &PromptDefinition,
    settings: &GenerationSettings,
    answer: &str,
) -> AppResult<Vec<String>> {
    let mut vars = HashMap::new();
    vars.insert("answer".to_string(), answer.to_string());
    let built = build_prompt(prompt, vars)?;
    tracing::debug!("Deriving follow-ups from prompt '{}'", built.source_prompt_id);

    let mut request = LlmRequest::new(built.user, settings.model.clone())
        .with_temperature(settings.temperature)
        .with_max_tokens(settings.max_tokens);
    if let Some(system) = built.system {
        request = request.with_system(system);
    }

    let response = llm.complete(&request).await?;

    match extract_followups(&response.content) {
        Err(err @ AppError::MalformedFollowup(_)) => {
            tracing::warn!("{}; returning no suggestions", err);
            Ok(Vec::new())
        }
        other => other,
    }
}
