mod queue;

pub use queue::TaskQueue;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle states a task record passes through within one control cycle.
///
/// Progression is forward-only:
/// `Created → Predicted → Executed → {Succeeded | RejectedByCritic | Failed}`.
/// `Deferred` is a reserved terminal state for tasks skipped by policy
/// gating; no orchestrator path currently assigns it — skipped tasks still
/// progress to `Executed` with an empty outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    #[default]
    Created,
    Predicted,
    Executed,
    Succeeded,
    RejectedByCritic,
    Failed,
    Deferred,
}

impl TaskState {
    pub fn allowed_transitions(&self) -> &'static [TaskState] {
        use TaskState::{
            Created, Deferred, Executed, Failed, Predicted, RejectedByCritic, Succeeded,
        };
        match self {
            Created => &[Predicted],
            Predicted => &[Executed, Deferred],
            Executed => &[Succeeded, RejectedByCritic, Failed],
            Succeeded => &[],
            RejectedByCritic => &[],
            Failed => &[],
            Deferred => &[],
        }
    }

    pub fn can_transition_to(&self, target: TaskState) -> bool {
        self.allowed_transitions().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Succeeded
                | TaskState::RejectedByCritic
                | TaskState::Failed
                | TaskState::Deferred
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Predicted => "predicted",
            Self::Executed => "executed",
            Self::Succeeded => "succeeded",
            Self::RejectedByCritic => "rejected_by_critic",
            Self::Failed => "failed",
            Self::Deferred => "deferred",
        };
        write!(f, "{}", s)
    }
}

/// A unit of work popped from the queue, one per control cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
}

impl Task {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
        }
    }
}
