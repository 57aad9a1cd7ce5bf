//! Prompt loader: built-in definitions plus YAML overrides.

use crate::types::PromptDefinition;
use bulletin_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Prompt used for the grounded answer call.
pub const ANSWER_PROMPT_ID: &str = "community.answer";

/// Prompt used to derive follow-up questions from an answer.
pub const FOLLOWUP_PROMPT_ID: &str = "community.followups";

const ANSWER_SYSTEM: &str = "You are a helpful assistant that answers community-related questions \
based on the following posts. Answer only from the supplied context. If the context does not \
contain the answer, say that the community board has no information about it.";

const FOLLOWUP_SYSTEM: &str = "Based on the assistant's answer, generate 3 short, helpful \
follow-up questions a user might ask next. Reply with just the questions, each on a new line.";

/// Return the built-in definition for `prompt_id`, if there is one.
pub fn builtin_prompt(prompt_id: &str) -> Option<PromptDefinition> {
    match prompt_id {
        ANSWER_PROMPT_ID => Some(PromptDefinition {
            id: ANSWER_PROMPT_ID.to_string(),
            title: "Grounded community answer".to_string(),
            api_version: "1.0".to_string(),
            system: Some(ANSWER_SYSTEM.to_string()),
            template: "Context:\n{{context}}\n\nQuestion:\n{{question}}".to_string(),
        }),
        FOLLOWUP_PROMPT_ID => Some(PromptDefinition {
            id: FOLLOWUP_PROMPT_ID.to_string(),
            title: "Follow-up questions".to_string(),
            api_version: "1.0".to_string(),
            system: Some(FOLLOWUP_SYSTEM.to_string()),
            template: "{{answer}}".to_string(),
        }),
        _ => None,
    }
}

fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".bulletin").join("prompts")
}

/// Load a prompt definition by ID.
///
/// A file named `<id>.yml` in `.bulletin/prompts/` overrides the built-in
/// definition of the same ID.
///
/// # Example
/// ```no_run
/// use bulletin_prompt::{load_prompt, ANSWER_PROMPT_ID};
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), ANSWER_PROMPT_ID)?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    if !prompt_file.exists() {
        return builtin_prompt(prompt_id).ok_or_else(|| {
            AppError::Prompt(format!(
                "Prompt '{}' is not built in and {:?} does not exist",
                prompt_id, prompt_file
            ))
        });
    }

    tracing::debug!("Loading prompt override from: {:?}", prompt_file);

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition, prompt_id)?;

    tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// List prompt IDs overridden in the workspace.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let dir = prompts_dir(workspace_path);

    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut prompt_ids = Vec::new();

    for entry in walkdir::WalkDir::new(&dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                prompt_ids.push(stem.to_string());
            }
        }
    }

    prompt_ids.sort();
    Ok(prompt_ids)
}

/// Validate a prompt definition loaded for `expected_id`.
fn validate_prompt(def: &PromptDefinition, expected_id: &str) -> AppResult<()> {
    if def.id != expected_id {
        return Err(AppError::Prompt(format!(
            "Prompt file for '{}' declares id '{}'",
            expected_id, def.id
        )));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
