use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::agent::{Completion, critic, executor, planner, predictor};
use crate::config::WardenConfig;
use crate::drift::{DriftMonitor, signal};
use crate::error::Result;
use crate::history::{TaskHistory, TaskRecord};
use crate::policy::{EffectivePolicy, PolicyMode, recommend_breadth, should_execute};
use crate::task::{Task, TaskQueue, TaskState};

use super::{CycleOutcome, HaltReason, RunReport, StopCause};

/// Drives the propose → predict → execute → critique → re-plan loop, one
/// task per cycle, and owns every piece of mutable run state: the task
/// queue, the history, the drift monitor, and the active policy mode.
///
/// The active mode is written in exactly one place (`apply_escalation`) and
/// only ever moves forward in the policy order. Construct one orchestrator
/// per run; instances are independent.
pub struct Orchestrator<C: Completion> {
    objective: String,
    completion: C,
    config: Arc<WardenConfig>,
    /// Active policy mode. Written only by `apply_escalation`.
    mode: PolicyMode,
    confidence: f64,
    queue: TaskQueue,
    history: TaskHistory,
    drift: DriftMonitor,
    cycles: u64,
}

impl<C: Completion> Orchestrator<C> {
    pub fn new(objective: impl Into<String>, completion: C, config: WardenConfig) -> Self {
        let config = Arc::new(config);
        Self {
            objective: objective.into(),
            completion,
            mode: config.policy.mode,
            confidence: 0.5,
            queue: TaskQueue::new(config.run.max_queue_size),
            history: TaskHistory::new(),
            drift: DriftMonitor::new(Arc::clone(&config)),
            config,
            cycles: 0,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn set_confidence(&mut self, confidence: f64) {
        self.confidence = confidence;
    }

    /// Seed the queue with an initial task, generating one from the
    /// objective when none is given.
    pub async fn seed(&mut self, initial_task: Option<&str>) -> Result<()> {
        let text = match initial_task {
            Some(text) => text.trim().to_string(),
            None => planner::generate_initial_task(&self.completion, &self.objective).await?,
        };

        let task = Task::new(text);
        self.history
            .record(&task.id, TaskRecord::new(&task.text, TaskState::Created));
        info!(task = %task.text, "Seeded initial task");
        self.queue.push(task);
        Ok(())
    }

    /// Execute one full control cycle.
    pub async fn step(&mut self) -> Result<CycleOutcome> {
        // Escalation applies before any other work so a halt recommendation
        // gates the whole cycle.
        self.apply_escalation(self.drift.recommended_mode());

        if self.mode.is_halt() {
            error!("Policy mode halt - no further work");
            return Ok(CycleOutcome::Halted(HaltReason::Policy));
        }

        let Some(task) = self.queue.pop() else {
            info!("Task queue empty - nothing to do");
            return Ok(CycleOutcome::QueueEmpty);
        };

        self.history
            .record(&task.id, TaskRecord::new(&task.text, TaskState::Predicted));
        let prediction = predictor::generate_prediction(
            &self.completion,
            &task.text,
            &self.objective,
            &self.history,
            &self.config,
        )
        .await?;

        // The one and only enforcement gate: execution and subtask planning
        // below both hang off this decision.
        let breadth = recommend_breadth(self.confidence, self.mode);
        let permitted = should_execute(self.mode, breadth);

        let outcome = if permitted {
            Some(executor::execute_task(&self.completion, &task.text).await?)
        } else {
            info!(
                mode = %self.mode,
                breadth = %breadth,
                confidence = self.confidence,
                "Execution skipped"
            );
            None
        };

        // The state models "decision made", not "work performed": a skipped
        // execution still advances to Executed, with a None outcome.
        self.history.record(
            &task.id,
            TaskRecord::new(&task.text, TaskState::Executed)
                .with_prediction(&prediction)
                .with_outcome(outcome.as_deref()),
        );

        let outcome_text = outcome.as_deref().unwrap_or("");
        let verdict = critic::evaluate(
            &self.completion,
            &task.text,
            &prediction,
            outcome_text,
            &self.objective,
            &self.config.critic,
            None,
        )
        .await?;

        let final_state = if verdict.success {
            TaskState::Succeeded
        } else if !verdict.feedback.is_empty() {
            TaskState::RejectedByCritic
        } else {
            TaskState::Failed
        };
        self.history.record(
            &task.id,
            TaskRecord::new(&task.text, final_state)
                .with_prediction(&prediction)
                .with_outcome(outcome.as_deref())
                .with_verdict(verdict.success, &verdict.feedback),
        );

        let drifted = self.drift.record_error(verdict.error);
        let feasible = signal::is_numeric_feasible(&prediction, outcome_text);
        self.drift.record_feasibility(feasible, verdict.success);

        if drifted {
            warn!(task_id = %task.id, z = self.drift.last_error_z(), "Perceptual drift detected");
            self.drift.register_drift();
        } else {
            self.drift.clear_streak();
        }

        if self.drift_streak_exceeded() {
            error!(
                streak = self.drift.drift_streak(),
                "Repeated drift detected - halting run"
            );
            return Ok(CycleOutcome::Halted(HaltReason::DriftStreak));
        }

        if planner::goal_achieved(&self.completion, &self.objective, outcome_text).await? {
            info!("Goal achieved - stopping early");
            return Ok(CycleOutcome::GoalAchieved);
        }

        if permitted {
            let cap = self
                .effective_policy()
                .max_subtasks_or(self.config.policy.max_subtasks);
            let subtasks =
                planner::generate_subtasks(&self.completion, &task.text, &self.objective, cap)
                    .await?;
            debug!(count = subtasks.len(), "Subtasks generated");
            for text in subtasks {
                let sub = Task::new(text);
                self.history
                    .record(&sub.id, TaskRecord::new(&sub.text, TaskState::Created));
                self.queue.push(sub);
            }
        }

        self.cycles += 1;

        if self.cycles % self.config.run.guard_interval == 0 && self.drift.severe() {
            error!("Severe instability detected - resetting drift monitor");
            // Full wipe of transient drift state; the escalated policy mode
            // survives because it lives here, not in the monitor.
            self.drift = DriftMonitor::new(Arc::clone(&self.config));
        }

        Ok(CycleOutcome::Continue)
    }

    /// Run cycles until a stop condition or the iteration budget.
    pub async fn run(&mut self) -> Result<RunReport> {
        info!(objective = %self.objective, mode = %self.mode, "Starting run");

        let stop = loop {
            if self.cycles >= self.config.run.max_iterations {
                break StopCause::IterationBudget;
            }
            match self.step().await? {
                CycleOutcome::Continue => {}
                CycleOutcome::QueueEmpty => break StopCause::QueueEmpty,
                CycleOutcome::GoalAchieved => break StopCause::GoalAchieved,
                CycleOutcome::Halted(reason) => break StopCause::Halted(reason),
            }
        };

        let report = RunReport {
            cycles: self.cycles,
            stop,
            final_mode: self.mode,
        };
        info!(cycles = report.cycles, stop = ?report.stop, mode = %report.final_mode, "Run completed");
        Ok(report)
    }

    /// The only writer of the active policy mode.
    ///
    /// Upgrades replace the shared configuration wholesale so the drift
    /// monitor observes the same mode; downgrade recommendations are
    /// silently ignored.
    fn apply_escalation(&mut self, recommended: PolicyMode) {
        if recommended > self.mode {
            info!(from = %self.mode, to = %recommended, "Policy escalated");
            self.mode = recommended;
            let next = Arc::new(self.config.with_policy_mode(recommended));
            self.config = Arc::clone(&next);
            self.drift.replace_config(next);
        }
    }

    fn drift_streak_exceeded(&self) -> bool {
        self.drift.drift_streak() > self.config.drift.max_drift_streak
    }

    pub fn mode(&self) -> PolicyMode {
        self.mode
    }

    /// Resolved per-mode overrides; recomputed on every call so it can
    /// never be stale across an escalation.
    pub fn effective_policy(&self) -> EffectivePolicy {
        EffectivePolicy::resolve(&self.config)
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn history(&self) -> &TaskHistory {
        &self.history
    }

    pub fn drift(&self) -> &DriftMonitor {
        &self.drift
    }

    /// Prediction bias signal for the external predictor, in `[0.7, 1.3]`.
    pub fn numeric_bias(&self) -> f64 {
        self.drift.numeric_bias()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WardenConfig {
        WardenConfig::default()
    }

    fn config_with_mode(mode: PolicyMode) -> WardenConfig {
        WardenConfig::default().with_policy_mode(mode)
    }

    fn dummy_llm(_: &str) -> String {
        "dummy".to_string()
    }

    #[test]
    fn test_escalation_is_monotonic() {
        let mut orch = Orchestrator::new("objective", dummy_llm, config());
        assert_eq!(orch.mode(), PolicyMode::Normal);

        orch.apply_escalation(PolicyMode::Enforced);
        assert_eq!(orch.mode(), PolicyMode::Enforced);

        // Downgrade attempts are silently ignored.
        orch.apply_escalation(PolicyMode::Guided);
        assert_eq!(orch.mode(), PolicyMode::Enforced);
        orch.apply_escalation(PolicyMode::Normal);
        assert_eq!(orch.mode(), PolicyMode::Enforced);

        orch.apply_escalation(PolicyMode::Halt);
        assert_eq!(orch.mode(), PolicyMode::Halt);
    }

    #[test]
    fn test_escalation_replaces_shared_config() {
        let mut orch = Orchestrator::new("objective", dummy_llm, config());
        assert_eq!(orch.effective_policy(), EffectivePolicy::default());

        orch.apply_escalation(PolicyMode::Enforced);
        assert_eq!(orch.config.policy.mode, PolicyMode::Enforced);
        assert_eq!(orch.effective_policy().max_subtasks, Some(2));
        assert_eq!(orch.drift.recommended_mode(), PolicyMode::Normal);
    }

    #[tokio::test]
    async fn test_halt_mode_ends_cycle_immediately() {
        let mut orch = Orchestrator::new("objective", dummy_llm, config_with_mode(PolicyMode::Halt));
        orch.seed(Some("a task")).await.unwrap();

        let outcome = orch.step().await.unwrap();
        assert_eq!(outcome, CycleOutcome::Halted(HaltReason::Policy));
        // No work performed: the task was never popped.
        assert_eq!(orch.queue_len(), 1);
    }

    #[tokio::test]
    async fn test_empty_queue_outcome() {
        let mut orch = Orchestrator::new("objective", dummy_llm, config());
        assert_eq!(orch.step().await.unwrap(), CycleOutcome::QueueEmpty);
    }

    #[tokio::test]
    async fn test_drift_streak_condition() {
        let mut orch = Orchestrator::new("objective", dummy_llm, config());
        for _ in 0..4 {
            orch.drift.register_drift();
        }
        assert!(orch.drift_streak_exceeded());
        // The policy halt path outranks it on the next cycle: four window
        // entries already count as severe.
        assert_eq!(orch.step().await.unwrap(), CycleOutcome::Halted(HaltReason::Policy));
    }

    #[tokio::test]
    async fn test_run_stops_on_empty_queue() {
        let llm = |prompt: &str| {
            if prompt.contains("Return ONLY valid JSON") {
                r#"{"success": true, "feedback": "ok"}"#.to_string()
            } else {
                "dummy".to_string()
            }
        };
        let mut orch = Orchestrator::new("objective", llm, config());
        orch.seed(Some("only task")).await.unwrap();

        let report = orch.run().await.unwrap();
        // "dummy" parses as neither subtasks nor goal confirmation, so the
        // single task is consumed and the queue drains.
        assert_eq!(report.stop, StopCause::QueueEmpty);
        assert_eq!(report.cycles, 1);
        assert_eq!(report.final_mode, PolicyMode::Normal);
    }

    #[tokio::test]
    async fn test_run_respects_iteration_budget() {
        let llm = |prompt: &str| {
            if prompt.contains("JSON array") {
                r#"["keep going"]"#.to_string()
            } else if prompt.contains("Return ONLY valid JSON") {
                r#"{"success": true, "feedback": "ok"}"#.to_string()
            } else if prompt.contains("Answer ONLY") {
                "NO".to_string()
            } else {
                "fine".to_string()
            }
        };

        let mut cfg = config();
        cfg.run.max_iterations = 5;
        let mut orch = Orchestrator::new("objective", llm, cfg);
        orch.seed(Some("start")).await.unwrap();

        let report = orch.run().await.unwrap();
        assert_eq!(report.stop, StopCause::IterationBudget);
        assert_eq!(report.cycles, 5);
    }

    #[tokio::test]
    async fn test_goal_achieved_stops_run() {
        let llm = |prompt: &str| {
            if prompt.contains("Answer ONLY") {
                "YES".to_string()
            } else if prompt.contains("Return ONLY valid JSON") {
                r#"{"success": true, "feedback": "ok"}"#.to_string()
            } else {
                "fine".to_string()
            }
        };

        let mut orch = Orchestrator::new("objective", llm, config());
        orch.seed(Some("finish it")).await.unwrap();

        let report = orch.run().await.unwrap();
        assert_eq!(report.stop, StopCause::GoalAchieved);
    }

    #[tokio::test]
    async fn test_subtasks_enqueued_under_normal_mode() {
        let llm = |prompt: &str| {
            if prompt.contains("JSON array") {
                r#"["sub one", "sub two"]"#.to_string()
            } else if prompt.contains("Return ONLY valid JSON") {
                r#"{"success": true, "feedback": "ok"}"#.to_string()
            } else if prompt.contains("Answer ONLY") {
                "NO".to_string()
            } else {
                "fine".to_string()
            }
        };

        let mut orch = Orchestrator::new("objective", llm, config());
        orch.seed(Some("parent")).await.unwrap();
        assert_eq!(orch.step().await.unwrap(), CycleOutcome::Continue);

        assert_eq!(orch.queue_len(), 2);
        assert_eq!(orch.history().len(), 3);
        // Children re-enter the lifecycle at Created.
        let created = orch
            .history()
            .retrieve_similar("sub one", 0.3, 10, false)
            .into_iter()
            .filter(|r| r.state == TaskState::Created)
            .count();
        assert_eq!(created, 2);
    }

    #[tokio::test]
    async fn test_enforced_subtask_cap_applies() {
        let llm = |prompt: &str| {
            if prompt.contains("JSON array") {
                r#"["a", "b", "c", "d", "e"]"#.to_string()
            } else if prompt.contains("Return ONLY valid JSON") {
                r#"{"success": true, "feedback": "ok"}"#.to_string()
            } else if prompt.contains("Answer ONLY") {
                "NO".to_string()
            } else {
                "fine".to_string()
            }
        };

        // Enforced with healthy confidence: execution permitted, but the
        // effective policy caps subtask generation at 2.
        let mut orch = Orchestrator::new("objective", llm, config_with_mode(PolicyMode::Enforced))
            .with_confidence(0.9);
        orch.seed(Some("parent")).await.unwrap();
        orch.step().await.unwrap();

        assert_eq!(orch.queue_len(), 2);
    }
}
