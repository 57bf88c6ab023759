//! System instruction loading.

use std::path::Path;

use chatkeep_core::llm::proxy::DEFAULT_SYSTEM_PROMPT;

/// Read the system instruction from `path`.
///
/// Falls back to [`DEFAULT_SYSTEM_PROMPT`] when the file is missing,
/// unreadable or blank.
pub async fn load_system_prompt(path: &Path) -> String {
    match tokio::fs::read_to_string(path).await {
        Ok(content) if !content.trim().is_empty() => {
            tracing::info!(path = %path.display(), "system prompt loaded");
            content.trim().to_string()
        }
        Ok(_) => {
            tracing::warn!(path = %path.display(), "system prompt file is empty, using default");
            DEFAULT_SYSTEM_PROMPT.to_string()
        }
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "failed to read system prompt, using default"
            );
            DEFAULT_SYSTEM_PROMPT.to_string()
        }
    }
}
