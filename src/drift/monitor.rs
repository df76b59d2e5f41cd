use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use crate::config::WardenConfig;
use crate::policy::PolicyMode;

use super::signal;

/// Number of trailing error samples forming the outlier baseline. Below this
/// count the monitor is in its cold-start grace period and flags nothing.
const ERROR_BASELINE_WINDOW: usize = 10;

/// Capacity of the sliding window of drift flags.
const DRIFT_WINDOW: usize = 20;

/// Capacity of the sliding window of feasibility observations.
const FEASIBILITY_WINDOW: usize = 50;

/// Floor substituted for a zero standard deviation.
const STD_FLOOR: f64 = 1e-8;

const BIAS_MIN: f64 = 0.7;
const BIAS_MAX: f64 = 1.3;

/// Accumulates reliability signals across cycles: perceptual-error outliers,
/// drift streaks, and numeric-feasibility confidence.
///
/// The monitor only recommends a policy mode; the orchestrator owns the
/// monotonic application of that recommendation. It is replaced wholesale
/// (same configuration, fresh state) when the periodic severity guard fires.
#[derive(Debug, Clone)]
pub struct DriftMonitor {
    config: Arc<WardenConfig>,
    error_history: Vec<f64>,
    last_error_z: f64,
    recent_drifts: VecDeque<bool>,
    drift_streak: u32,
    feasibility_history: VecDeque<(bool, bool)>,
    numeric_bias: f64,
}

impl DriftMonitor {
    pub fn new(config: Arc<WardenConfig>) -> Self {
        Self {
            config,
            error_history: Vec::new(),
            last_error_z: 0.0,
            recent_drifts: VecDeque::with_capacity(DRIFT_WINDOW),
            drift_streak: 0,
            feasibility_history: VecDeque::with_capacity(FEASIBILITY_WINDOW),
            numeric_bias: 1.0,
        }
    }

    /// Record a perceptual error and check it against the trailing baseline.
    ///
    /// Returns `true` when the error is a z-score outlier. Always `false`
    /// during the cold-start grace period (fewer than 10 samples).
    pub fn record_error(&mut self, error: f64) -> bool {
        self.error_history.push(error);

        if self.error_history.len() < ERROR_BASELINE_WINDOW {
            return false;
        }

        let recent = &self.error_history[self.error_history.len() - ERROR_BASELINE_WINDOW..];
        let mean = signal::mean(recent);
        let mut std = signal::population_std(recent);
        if std == 0.0 {
            std = STD_FLOOR;
        }
        let z = signal::z_score(error, mean, std).abs();
        self.last_error_z = z;

        z > self.config.drift.error_z_threshold
    }

    /// Record a feasibility observation and nudge the numeric bias.
    ///
    /// The bias multiplies from its current value, so the result is
    /// path-dependent — the same history in a different order can settle on
    /// a different bias. No update happens while the feasible subset is
    /// empty.
    pub fn record_feasibility(&mut self, was_numeric_feasible: bool, success: bool) {
        if self.feasibility_history.len() == FEASIBILITY_WINDOW {
            self.feasibility_history.pop_front();
        }
        self.feasibility_history
            .push_back((was_numeric_feasible, success));

        let Some(rate) = self.feasible_success_rate() else {
            return;
        };

        if rate > self.config.drift.feas_conf_high {
            self.numeric_bias = (self.numeric_bias * 1.1).min(BIAS_MAX);
        } else if rate < self.config.drift.feas_conf_low {
            self.numeric_bias = (self.numeric_bias * 0.9).max(BIAS_MIN);
        }

        debug!(
            rate = rate,
            bias = self.numeric_bias,
            "Feasibility recorded"
        );
    }

    /// Record a detected drift and extend the streak.
    pub fn register_drift(&mut self) {
        if self.recent_drifts.len() == DRIFT_WINDOW {
            self.recent_drifts.pop_front();
        }
        self.recent_drifts.push_back(true);
        self.drift_streak += 1;
    }

    /// Reset the streak counter. The drift window is left intact.
    pub fn clear_streak(&mut self) {
        self.drift_streak = 0;
    }

    /// Whether the situation is severe enough for a reset.
    ///
    /// Two independent checks, either trips: more than 3 drift flags in the
    /// window (sudden instability), or a feasibility-conditioned success
    /// rate below `low_conf_threshold` (sustained poor calibration).
    pub fn severe(&self) -> bool {
        if self.recent_drifts.iter().filter(|d| **d).count() > 3 {
            return true;
        }

        match self.feasible_success_rate() {
            Some(rate) => rate < self.config.drift.low_conf_threshold,
            None => false,
        }
    }

    /// Policy mode this monitor's state argues for.
    ///
    /// A recommendation only — the orchestrator applies it monotonically
    /// against the active mode.
    pub fn recommended_mode(&self) -> PolicyMode {
        if self.severe()
            || self.drift_streak >= self.config.drift.max_drift_streak
            || self.last_error_z >= self.config.drift.error_z_threshold
        {
            PolicyMode::Halt
        } else {
            PolicyMode::Normal
        }
    }

    /// Success rate over observations that were numeric-feasible, `None`
    /// when there are none.
    fn feasible_success_rate(&self) -> Option<f64> {
        let successes: Vec<f64> = self
            .feasibility_history
            .iter()
            .filter(|(feasible, _)| *feasible)
            .map(|(_, success)| if *success { 1.0 } else { 0.0 })
            .collect();

        if successes.is_empty() {
            None
        } else {
            Some(signal::mean(&successes))
        }
    }

    pub fn drift_streak(&self) -> u32 {
        self.drift_streak
    }

    pub fn last_error_z(&self) -> f64 {
        self.last_error_z
    }

    /// Adaptation factor for downstream prediction logic, in `[0.7, 1.3]`.
    pub fn numeric_bias(&self) -> f64 {
        self.numeric_bias
    }

    pub fn sample_count(&self) -> usize {
        self.error_history.len()
    }

    /// Swap in the replacement configuration after an escalation so monitor
    /// and orchestrator observe the same mode.
    pub fn replace_config(&mut self, config: Arc<WardenConfig>) {
        self.config = config;
    }
}
