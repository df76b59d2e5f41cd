//! Relevance scoring for history retrieval.
//!
//! Word-overlap is a placeholder for embedding similarity; the shape of the
//! scoring (similarity x outcome severity x policy multiplier) is what
//! downstream consumers depend on.

use std::collections::HashSet;

use crate::policy::PolicyMode;

use super::TaskRecord;

/// Jaccard similarity over lowercase word sets.
///
/// An empty union means "no relation" and scores 0.0 rather than dividing
/// by zero.
pub fn word_overlap(a: &str, b: &str) -> f64 {
    let words_a: HashSet<String> = a.to_lowercase().split_whitespace().map(str::to_string).collect();
    let words_b: HashSet<String> = b.to_lowercase().split_whitespace().map(str::to_string).collect();

    let union = words_a.union(&words_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = words_a.intersection(&words_b).count();
    intersection as f64 / union as f64
}

/// Scalar relevance of a past record to the current task.
///
/// Failed outcomes weigh double — a near-miss from the past is worth more
/// as context than a success. Under `Halt` every score collapses to zero.
pub fn relevance_score(record: &TaskRecord, current_task: &str, mode: PolicyMode) -> f64 {
    if mode == PolicyMode::Halt {
        return 0.0;
    }

    let similarity = word_overlap(current_task, &record.task_text);
    let severity = if record.success { 1.0 } else { 2.0 };

    (similarity * severity).max(0.0)
}
