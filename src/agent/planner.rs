use serde_json::Value;
use tracing::warn;

use crate::error::Result;

use super::{Completion, normalize_whitespace, prompts};

/// Generate up to `max_subtasks` subtasks advancing the objective.
///
/// The completion must return a JSON array of strings; anything malformed
/// degrades to zero subtasks. Entries are whitespace-normalized, empties
/// dropped, and the cap enforced by truncation.
pub async fn generate_subtasks<C>(
    completion: &C,
    current_task: &str,
    objective: &str,
    max_subtasks: usize,
) -> Result<Vec<String>>
where
    C: Completion + ?Sized,
{
    let prompt = prompts::subtask_prompt(objective, current_task);
    let response = completion.complete(&prompt).await?;

    let mut subtasks: Vec<String> = parse_string_array(&response)
        .into_iter()
        .map(|s| normalize_whitespace(&s))
        .filter(|s| !s.is_empty())
        .collect();

    subtasks.truncate(max_subtasks);
    Ok(subtasks)
}

/// Ask whether the latest outcome achieved the final objective.
pub async fn goal_achieved<C>(completion: &C, objective: &str, result: &str) -> Result<bool>
where
    C: Completion + ?Sized,
{
    let prompt = prompts::goal_prompt(objective, result);
    let response = completion.complete(&prompt).await?;
    Ok(response.to_uppercase().contains("YES"))
}

/// Generate the very first task for an objective, for seeding.
pub async fn generate_initial_task<C>(completion: &C, objective: &str) -> Result<String>
where
    C: Completion + ?Sized,
{
    let prompt = prompts::initial_task_prompt(objective);
    let response = completion.complete(&prompt).await?;
    Ok(response.trim().to_string())
}

/// Parse a JSON array of strings, empty on any failure.
fn parse_string_array(response: &str) -> Vec<String> {
    match serde_json::from_str::<Value>(response.trim()) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        Ok(_) => {
            warn!("Subtask response was valid JSON but not a list - no subtasks generated");
            Vec::new()
        }
        Err(e) => {
            warn!(error = %e, "Subtask JSON parse failed - no subtasks generated");
            Vec::new()
        }
    }
}
