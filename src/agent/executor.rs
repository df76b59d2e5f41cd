use crate::error::Result;

use super::{Completion, normalize_whitespace};

/// Execute a task and return the outcome string.
///
/// The task text goes to the completion seam as-is; real tool execution
/// lives behind the seam. Only reachable through the orchestrator's policy
/// gate.
pub async fn execute_task<C>(completion: &C, task_text: &str) -> Result<String>
where
    C: Completion + ?Sized,
{
    let raw = completion.complete(task_text).await?;
    Ok(normalize_whitespace(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_outcome_is_normalized() {
        let llm = |prompt: &str| format!("did:\n\t{}  ", prompt);
        assert_eq!(
            execute_task(&llm, "the task").await.unwrap(),
            "did: the task"
        );
    }
}
