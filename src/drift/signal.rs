//! Pure statistical primitives used by the drift monitor.

/// Mean of a slice, 0.0 when empty.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len().max(1) as f64
}

/// Population standard deviation of a slice, 0.0 when empty.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Z-score of `value` against `mean`/`std`, 0.0 when `std` is zero.
pub fn z_score(value: f64, mean: f64, std: f64) -> f64 {
    if std == 0.0 {
        return 0.0;
    }
    (value - mean) / std
}

/// Classify whether a prediction and an outcome are numeric-feasible.
///
/// Feasible when both parse as numbers, or both parse as JSON arrays of the
/// same length. Otherwise falls back to a weak length heuristic: non-empty
/// strings whose lengths differ by at most 50 characters.
pub fn is_numeric_feasible(prediction: &str, outcome: &str) -> bool {
    if prediction.trim().parse::<f64>().is_ok() && outcome.trim().parse::<f64>().is_ok() {
        return true;
    }

    let arrays = (
        serde_json::from_str::<serde_json::Value>(prediction.trim()),
        serde_json::from_str::<serde_json::Value>(outcome.trim()),
    );
    if let (Ok(serde_json::Value::Array(p)), Ok(serde_json::Value::Array(a))) = arrays {
        return p.len() == a.len();
    }

    if prediction.is_empty() || outcome.is_empty() {
        return false;
    }
    prediction.chars().count().abs_diff(outcome.chars().count()) <= 50
}
