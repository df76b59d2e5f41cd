use crate::config::WardenConfig;

use super::PolicyMode;

/// Behavioral parameters resolved from the active policy mode.
///
/// `None` means "no override — use the default"; it must never be read as
/// zero or false. Resolution is a pure function of the configuration's
/// active mode and is recomputed on every access, so it can never go stale
/// across an escalation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectivePolicy {
    pub max_subtasks: Option<usize>,
    pub critic_strictness: Option<f64>,
    pub prediction_bias_delta: Option<f64>,
    pub halt: Option<bool>,
}

impl EffectivePolicy {
    /// Resolve the overrides for the configuration's active mode.
    ///
    /// `Normal` carries no overrides. Each higher mode adds to the previous
    /// one: `Guided` shapes the critic and predictor, `Enforced` additionally
    /// caps subtask generation, `Halt` additionally sets the halt flag.
    pub fn resolve(config: &WardenConfig) -> Self {
        let mut effective = Self::default();
        let mode = config.policy.mode;

        if mode >= PolicyMode::Guided {
            effective.critic_strictness = Some(config.policy.strict_critic_strictness);
            effective.prediction_bias_delta = Some(config.policy.strict_prediction_bias_delta);
        }
        if mode >= PolicyMode::Enforced {
            effective.max_subtasks = Some(config.policy.strict_max_subtasks);
        }
        if mode == PolicyMode::Halt {
            effective.halt = Some(true);
        }

        effective
    }

    pub fn is_halt(&self) -> bool {
        self.halt.unwrap_or(false)
    }

    pub fn max_subtasks_or(&self, default: usize) -> usize {
        self.max_subtasks.unwrap_or(default)
    }
}
