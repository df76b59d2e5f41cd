pub mod critic;
pub mod executor;
pub mod planner;
pub mod predictor;
pub mod prompts;

use async_trait::async_trait;

use crate::error::Result;

/// The single opaque seam to the black-box text-completion function.
///
/// Everything the kernel asks of the outside world — predictions,
/// executions, critic verdicts, subtask plans — goes through this one
/// call. No timeout or cancellation semantics are defined here; callers
/// needing them wrap their implementation.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Plain functions are completions, mirroring a bare `llm(prompt)` callable.
#[async_trait]
impl<F> Completion for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    async fn complete(&self, prompt: &str) -> Result<String> {
        Ok(self(prompt))
    }
}

/// Collapse all runs of whitespace (including newlines and tabs) to single
/// spaces.
pub(crate) fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
