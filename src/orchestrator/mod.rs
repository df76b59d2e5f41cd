mod engine;

pub use engine::Orchestrator;

use std::fmt;

use crate::policy::PolicyMode;

/// Why a run stopped issuing cycles.
///
/// Halts are designed terminal outcomes, not errors: a run that stops
/// because policy demanded it completed normally and reports why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// The active policy mode reached `Halt`.
    Policy,
    /// The consecutive drift streak overflowed its limit mid-cycle.
    DriftStreak,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Policy => "policy halt",
            Self::DriftStreak => "drift streak overflow",
        };
        write!(f, "{}", s)
    }
}

/// Result of one control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Cycle completed, more work may remain.
    Continue,
    /// Nothing to do; the queue was empty.
    QueueEmpty,
    /// The goal check was satisfied by this cycle's outcome.
    GoalAchieved,
    Halted(HaltReason),
}

/// Why the run loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    QueueEmpty,
    GoalAchieved,
    Halted(HaltReason),
    IterationBudget,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub cycles: u64,
    pub stop: StopCause,
    pub final_mode: PolicyMode,
}
