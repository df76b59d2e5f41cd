mod relevance;

pub use relevance::{relevance_score, word_overlap};

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::TaskState;

/// Lifecycle snapshot of one task, keyed by task id in [`TaskHistory`].
///
/// `outcome` is `None` when execution was skipped by policy gating — a
/// different thing from `Some("")`, a real empty result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_text: String,
    pub state: TaskState,
    pub prediction: String,
    pub outcome: Option<String>,
    pub success: bool,
    pub feedback: String,
    pub timestamp: DateTime<Utc>,
}

impl TaskRecord {
    pub fn new(task_text: impl Into<String>, state: TaskState) -> Self {
        Self {
            task_text: task_text.into(),
            state,
            prediction: String::new(),
            outcome: None,
            success: false,
            feedback: String::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_prediction(mut self, prediction: impl Into<String>) -> Self {
        self.prediction = prediction.into();
        self
    }

    pub fn with_outcome(mut self, outcome: Option<&str>) -> Self {
        self.outcome = outcome.map(str::to_string);
        self
    }

    pub fn with_verdict(mut self, success: bool, feedback: impl Into<String>) -> Self {
        self.success = success;
        self.feedback = feedback.into();
        self
    }

    /// Whether the executor actually ran for this record.
    pub fn was_executed(&self) -> bool {
        self.outcome.is_some()
    }
}

/// In-memory task history: task id → latest record.
///
/// Latest-state-wins — each `record` call for an id replaces the previous
/// entry, it is not an append log.
#[derive(Debug, Clone, Default)]
pub struct TaskHistory {
    records: HashMap<String, TaskRecord>,
}

impl TaskHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, task_id: &str, record: TaskRecord) {
        self.records.insert(task_id.to_string(), record);
    }

    pub fn get(&self, task_id: &str) -> Option<&TaskRecord> {
        self.records.get(task_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records similar to `task_text`, most relevant first.
    ///
    /// Ranked by word-overlap similarity weighted toward failed outcomes
    /// when `prefer_failures` is set; entries below `threshold` similarity
    /// are dropped, and at most `limit` are returned.
    pub fn retrieve_similar(
        &self,
        task_text: &str,
        threshold: f64,
        limit: usize,
        prefer_failures: bool,
    ) -> Vec<&TaskRecord> {
        let mut scored: Vec<(f64, &TaskRecord)> = self
            .records
            .values()
            .filter_map(|record| {
                let similarity = word_overlap(task_text, &record.task_text);
                if similarity < threshold {
                    return None;
                }
                let severity = if prefer_failures && !record.success {
                    2.0
                } else {
                    1.0
                };
                Some((similarity * severity, record))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, record)| record)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_state_wins() {
        let mut history = TaskHistory::new();
        history.record("t1", TaskRecord::new("write report", TaskState::Predicted));
        history.record(
            "t1",
            TaskRecord::new("write report", TaskState::Succeeded)
                .with_prediction("a report")
                .with_outcome(Some("the report"))
                .with_verdict(true, "good"),
        );

        assert_eq!(history.len(), 1);
        let record = history.get("t1").unwrap();
        assert_eq!(record.state, TaskState::Succeeded);
        assert!(record.success);
    }

    #[test]
    fn test_skipped_execution_is_distinguishable() {
        let skipped = TaskRecord::new("task", TaskState::Executed).with_outcome(None);
        let empty = TaskRecord::new("task", TaskState::Executed).with_outcome(Some(""));
        assert!(!skipped.was_executed());
        assert!(empty.was_executed());
    }

    #[test]
    fn test_retrieve_similar_filters_by_threshold() {
        let mut history = TaskHistory::new();
        history.record(
            "t1",
            TaskRecord::new("fetch the weather report", TaskState::Succeeded),
        );
        history.record(
            "t2",
            TaskRecord::new("bake a chocolate cake", TaskState::Succeeded),
        );

        let similar = history.retrieve_similar("fetch the weather report", 0.6, 5, false);
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].task_text, "fetch the weather report");
    }

    #[test]
    fn test_retrieve_similar_prefers_failures() {
        let mut history = TaskHistory::new();
        history.record(
            "ok",
            TaskRecord::new("send the email", TaskState::Succeeded).with_verdict(true, ""),
        );
        history.record(
            "bad",
            TaskRecord::new("send the email", TaskState::Failed).with_verdict(false, ""),
        );

        let similar = history.retrieve_similar("send the email", 0.5, 1, true);
        assert_eq!(similar.len(), 1);
        assert!(!similar[0].success);
    }

    #[test]
    fn test_retrieve_similar_respects_limit() {
        let mut history = TaskHistory::new();
        for i in 0..5 {
            history.record(
                &format!("t{}", i),
                TaskRecord::new("list the files", TaskState::Succeeded),
            );
        }
        assert_eq!(history.retrieve_similar("list the files", 0.5, 3, false).len(), 3);
    }
}
