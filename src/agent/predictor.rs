use crate::config::{MemoryConfig, WardenConfig};
use crate::error::Result;
use crate::history::TaskHistory;

use super::{Completion, normalize_whitespace, prompts};

const EMPTY_PREDICTION_PLACEHOLDER: &str = "(no prediction generated)";

/// Maximum characters of any one field in a memory context line.
const CONTEXT_FIELD_BUDGET: usize = 100;

/// Generate a concise prediction of the expected task outcome.
///
/// The completion output is whitespace-normalized, protected against empty
/// output, and truncated to the configured length with an ellipsis.
pub async fn generate_prediction<C>(
    completion: &C,
    task_text: &str,
    objective: &str,
    history: &TaskHistory,
    config: &WardenConfig,
) -> Result<String>
where
    C: Completion + ?Sized,
{
    let memory_context = build_prediction_context(task_text, history, &config.memory);
    let prompt = prompts::prediction_prompt(&memory_context, objective, task_text);

    let mut prediction = normalize_whitespace(&completion.complete(&prompt).await?);

    if prediction.is_empty() {
        prediction = EMPTY_PREDICTION_PLACEHOLDER.to_string();
    }

    let max_length = config.prediction.max_length;
    if prediction.chars().count() > max_length {
        let cut: String = prediction.chars().take(max_length).collect();
        prediction = format!("{}...", cut.trim_end_matches([' ', '.', ',', '!', '?']));
    }

    Ok(prediction)
}

/// Build optional context from relevant past outcomes.
///
/// Empty when retrieval is disabled or nothing relevant exists. The result
/// is opaque, human-readable text — prediction logic must not parse or
/// branch on its contents; semantic interpretation belongs to policy layers.
pub fn build_prediction_context(
    task_text: &str,
    history: &TaskHistory,
    config: &MemoryConfig,
) -> String {
    if !config.retrieval_enabled {
        return String::new();
    }

    let similar = history.retrieve_similar(
        task_text,
        config.similarity_threshold,
        config.retrieval_limit,
        config.prefer_failures,
    );
    if similar.is_empty() {
        return String::new();
    }

    let mut lines = vec!["Relevant past outcomes:".to_string()];
    for record in similar {
        lines.push(format!(
            "- Task: {} | State: {} | Outcome: {} | Success: {} | Feedback: {}",
            clip(&record.task_text),
            record.state,
            clip(record.outcome.as_deref().unwrap_or("(no outcome)")),
            record.success,
            clip(if record.feedback.is_empty() {
                "(no feedback)"
            } else {
                &record.feedback
            }),
        ));
    }

    lines.join("\n")
}

fn clip(s: &str) -> String {
    if s.chars().count() <= CONTEXT_FIELD_BUDGET {
        s.to_string()
    } else {
        let cut: String = s.chars().take(CONTEXT_FIELD_BUDGET).collect();
        format!("{}...", cut)
    }
}
