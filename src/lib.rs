//! taskwarden — a control kernel for autonomous task loops.
//!
//! The kernel governs a propose → predict → execute → critique → re-plan
//! loop driven by a black-box text-completion function. Its core is policy
//! escalation and drift control: statistical outliers in perceptual error,
//! loss of numeric feasibility, and repeated anomalies irreversibly escalate
//! the operating policy from unrestricted autonomy (`Normal`) toward
//! advisory (`Guided`), enforced (`Enforced`), and full stop (`Halt`).

pub mod agent;
pub mod config;
pub mod drift;
pub mod error;
pub mod history;
pub mod orchestrator;
pub mod policy;
pub mod task;

pub use agent::Completion;
pub use agent::critic::Verdict;
pub use config::WardenConfig;
pub use drift::DriftMonitor;
pub use error::{Result, WardenError};
pub use history::{TaskHistory, TaskRecord};
pub use orchestrator::{CycleOutcome, HaltReason, Orchestrator, RunReport, StopCause};
pub use policy::{Breadth, EffectivePolicy, PolicyMode, recommend_breadth, should_execute};
pub use task::{Task, TaskQueue, TaskState};
