use serde::Deserialize;
use tracing::warn;

use crate::config::CriticConfig;
use crate::error::Result;

use super::{Completion, prompts};

/// Critic judgment of one cycle's outcome.
///
/// `error` is a perceptual error score in `[0, 1]` — 0.0 for aligned
/// results, 1.0 for failure. Binary in this design, typed as a float so it
/// can evolve into a graded score.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub success: bool,
    pub feedback: String,
    pub error: f64,
}

/// External check that can veto a success verdict, given task text and
/// outcome.
pub type Verifier<'a> = &'a (dyn Fn(&str, &str) -> bool + Sync);

/// Evaluate a task result with the critic prompt.
///
/// With `cross_validation` enabled, the critic is asked twice and success
/// requires strict agreement; a disagreement is logged as potential
/// instability. An optional verifier hook can veto success after the fact.
pub async fn evaluate<C>(
    completion: &C,
    task_text: &str,
    prediction: &str,
    result: &str,
    objective: &str,
    config: &CriticConfig,
    verifier: Option<Verifier<'_>>,
) -> Result<Verdict>
where
    C: Completion + ?Sized,
{
    let prompt = prompts::critic_prompt(task_text, prediction, result, objective);

    let (success_a, feedback_a) = parse_response(&completion.complete(&prompt).await?);

    let (mut success, mut feedback) = if config.cross_validation {
        let (success_b, _) = parse_response(&completion.complete(&prompt).await?);
        if success_a != success_b {
            warn!(task = %task_text, "Critic disagreement detected - potential instability");
        }
        (
            success_a && success_b,
            format!("{} | Consensus: {}", feedback_a, success_b),
        )
    } else {
        (success_a, feedback_a)
    };

    if let Some(verify) = verifier {
        if !verify(task_text, result) {
            success = false;
            feedback.push_str(" | External verification failed");
        }
    }

    let error = if success { 0.0 } else { 1.0 };

    Ok(Verdict {
        success,
        feedback,
        error,
    })
}

fn parse_response(response: &str) -> (bool, String) {
    #[derive(Deserialize)]
    struct Raw {
        #[serde(default)]
        success: bool,
        #[serde(default)]
        feedback: Option<String>,
    }

    match serde_json::from_str::<Raw>(response.trim()) {
        Ok(raw) => (
            raw.success,
            raw.feedback.unwrap_or_else(|| "No feedback".to_string()),
        ),
        Err(e) => {
            warn!(error = %e, "Critic JSON parse failed - defaulting to failure (pessimistic)");
            (false, "parse failed - treated as non-success".to_string())
        }
    }
}
