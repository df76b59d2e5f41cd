use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{Result, WardenError};
use crate::policy::PolicyMode;

/// Central configuration for a run.
///
/// Immutable per run: escalation replaces the whole object (see
/// `Orchestrator::escalate`), it is never mutated field-by-field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    pub run: RunConfig,
    pub drift: DriftConfig,
    pub policy: PolicyConfig,
    pub critic: CriticConfig,
    pub memory: MemoryConfig,
    pub prediction: PredictionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub max_iterations: u64,
    pub max_queue_size: usize,
    /// Check the drift monitor for a severe-state reset every N cycles.
    pub guard_interval: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            max_queue_size: 50,
            guard_interval: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Absolute z-score above which a perceptual error counts as an outlier.
    pub error_z_threshold: f64,
    pub max_drift_streak: u32,
    /// Feasibility-conditioned success rate above which numeric bias grows.
    pub feas_conf_high: f64,
    /// Feasibility-conditioned success rate below which numeric bias shrinks.
    pub feas_conf_low: f64,
    /// Success rate below which the situation counts as severe.
    pub low_conf_threshold: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            error_z_threshold: 3.0,
            max_drift_streak: 3,
            feas_conf_high: 0.8,
            feas_conf_low: 0.5,
            low_conf_threshold: 0.4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Starting policy mode for the run. Escalation only moves it forward.
    pub mode: PolicyMode,
    /// Default subtask cap when the effective policy carries no override.
    pub max_subtasks: usize,
    /// Strict-mode overrides resolved via `EffectivePolicy` — read them
    /// through `EffectivePolicy::resolve`, direct access is not policy-aware.
    pub strict_max_subtasks: usize,
    pub strict_critic_strictness: f64,
    pub strict_prediction_bias_delta: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            mode: PolicyMode::Normal,
            max_subtasks: 5,
            strict_max_subtasks: 2,
            strict_critic_strictness: 0.9,
            strict_prediction_bias_delta: -0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticConfig {
    /// Evaluate twice and require both verdicts to agree on success.
    pub cross_validation: bool,
}

impl Default for CriticConfig {
    fn default() -> Self {
        Self {
            cross_validation: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Retrieve similar past outcomes as prediction context.
    pub retrieval_enabled: bool,
    pub retrieval_limit: usize,
    pub similarity_threshold: f64,
    /// Rank failed outcomes above successful ones during retrieval.
    pub prefer_failures: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            retrieval_enabled: false,
            retrieval_limit: 5,
            similarity_threshold: 0.6,
            prefer_failures: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Predictions longer than this are truncated with an ellipsis.
    pub max_length: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self { max_length: 200 }
    }
}

impl WardenConfig {
    pub async fn load(path: &Path) -> Result<Self> {
        let config: Self = if path.exists() {
            let content = fs::read_to_string(path).await?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let content =
            toml::to_string_pretty(self).map_err(|e| WardenError::Config(e.to_string()))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Validate configuration values for consistency and safety.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.run.max_iterations == 0 {
            errors.push("run.max_iterations must be greater than 0");
        }
        if self.run.max_queue_size == 0 {
            errors.push("run.max_queue_size must be greater than 0");
        }
        if self.run.guard_interval == 0 {
            errors.push("run.guard_interval must be greater than 0");
        }

        if self.drift.error_z_threshold <= 0.0 {
            errors.push("drift.error_z_threshold must be positive");
        }
        if !(0.0..=1.0).contains(&self.drift.feas_conf_high) {
            errors.push("drift.feas_conf_high must be between 0.0 and 1.0");
        }
        if !(0.0..=1.0).contains(&self.drift.feas_conf_low) {
            errors.push("drift.feas_conf_low must be between 0.0 and 1.0");
        }
        if !(0.0..=1.0).contains(&self.drift.low_conf_threshold) {
            errors.push("drift.low_conf_threshold must be between 0.0 and 1.0");
        }
        if self.drift.feas_conf_low >= self.drift.feas_conf_high {
            errors.push("drift.feas_conf_low must be less than drift.feas_conf_high");
        }

        if self.policy.max_subtasks == 0 {
            errors.push("policy.max_subtasks must be greater than 0");
        }
        if !(0.0..=1.0).contains(&self.policy.strict_critic_strictness) {
            errors.push("policy.strict_critic_strictness must be between 0.0 and 1.0");
        }

        if !(0.0..=1.0).contains(&self.memory.similarity_threshold) {
            errors.push("memory.similarity_threshold must be between 0.0 and 1.0");
        }
        if self.prediction.max_length == 0 {
            errors.push("prediction.max_length must be greater than 0");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(WardenError::Config(errors.join("; ")))
        }
    }

    /// Copy of this configuration carrying a new policy mode.
    ///
    /// The escalation rule replaces the whole shared object with the result
    /// so the orchestrator and drift monitor observe the change identically.
    pub fn with_policy_mode(&self, mode: PolicyMode) -> Self {
        let mut next = self.clone();
        next.policy.mode = mode;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(WardenConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_confidence_band_rejected() {
        let mut config = WardenConfig::default();
        config.drift.feas_conf_low = 0.9;
        config.drift.feas_conf_high = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_guard_interval_rejected() {
        let mut config = WardenConfig::default();
        config.run.guard_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_policy_mode_leaves_original_untouched() {
        let config = WardenConfig::default();
        let escalated = config.with_policy_mode(PolicyMode::Enforced);
        assert_eq!(config.policy.mode, PolicyMode::Normal);
        assert_eq!(escalated.policy.mode, PolicyMode::Enforced);
        assert_eq!(escalated.run.max_iterations, config.run.max_iterations);
    }

    #[tokio::test]
    async fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.toml");

        let mut config = WardenConfig::default();
        config.policy.mode = PolicyMode::Guided;
        config.drift.error_z_threshold = 2.5;
        config.save(&path).await.unwrap();

        let loaded = WardenConfig::load(&path).await.unwrap();
        assert_eq!(loaded.policy.mode, PolicyMode::Guided);
        assert_eq!(loaded.drift.error_z_threshold, 2.5);
    }

    #[tokio::test]
    async fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = WardenConfig::load(&dir.path().join("absent.toml"))
            .await
            .unwrap();
        assert_eq!(config.run.max_iterations, 100);
    }
}
