use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::PolicyMode;

/// Recommended scope of action for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Breadth {
    Full,
    Moderate,
    Restricted,
    Deferred,
}

impl fmt::Display for Breadth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Full => "FULL",
            Self::Moderate => "MODERATE",
            Self::Restricted => "RESTRICTED",
            Self::Deferred => "DEFERRED",
        };
        write!(f, "{}", s)
    }
}

/// Map confidence to a recommended breadth level (soft guidance only).
///
/// `Normal` mode is never affected by confidence; confidence-based
/// throttling is a guided/enforced-mode feature. Band lower bounds are
/// inclusive.
pub fn recommend_breadth(confidence: f64, mode: PolicyMode) -> Breadth {
    let recommended = if mode == PolicyMode::Normal {
        Breadth::Full
    } else if confidence >= 0.8 {
        Breadth::Full
    } else if confidence >= 0.5 {
        Breadth::Moderate
    } else if confidence >= 0.3 {
        Breadth::Restricted
    } else {
        Breadth::Deferred
    };

    debug!(
        breadth = %recommended,
        confidence = confidence,
        mode = %mode,
        "Breadth recommended"
    );

    recommended
}

/// The single authoritative enforcement gate.
///
/// Every mode but `Enforced` permits execution; `Guided` exposes the
/// recommendation without acting on it. Under `Enforced`, only a `Deferred`
/// recommendation blocks.
pub fn should_execute(mode: PolicyMode, breadth: Breadth) -> bool {
    if mode != PolicyMode::Enforced {
        return true;
    }
    breadth != Breadth::Deferred
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_ignores_confidence() {
        for confidence in [0.0, 0.2999, 0.5, 0.9] {
            assert_eq!(
                recommend_breadth(confidence, PolicyMode::Normal),
                Breadth::Full
            );
        }
    }

    #[test]
    fn test_band_boundaries_inclusive() {
        assert_eq!(recommend_breadth(0.8, PolicyMode::Guided), Breadth::Full);
        assert_eq!(
            recommend_breadth(0.7999, PolicyMode::Guided),
            Breadth::Moderate
        );
        assert_eq!(
            recommend_breadth(0.5, PolicyMode::Guided),
            Breadth::Moderate
        );
        assert_eq!(
            recommend_breadth(0.3, PolicyMode::Guided),
            Breadth::Restricted
        );
        assert_eq!(
            recommend_breadth(0.2999, PolicyMode::Guided),
            Breadth::Deferred
        );
    }

    #[test]
    fn test_guided_is_advisory_only() {
        assert!(should_execute(PolicyMode::Guided, Breadth::Deferred));
        assert!(should_execute(PolicyMode::Normal, Breadth::Deferred));
        assert!(should_execute(PolicyMode::Halt, Breadth::Deferred));
    }

    #[test]
    fn test_enforced_blocks_only_deferred() {
        assert!(!should_execute(PolicyMode::Enforced, Breadth::Deferred));
        assert!(should_execute(PolicyMode::Enforced, Breadth::Full));
        assert!(should_execute(PolicyMode::Enforced, Breadth::Moderate));
        assert!(should_execute(PolicyMode::Enforced, Breadth::Restricted));
    }
}
