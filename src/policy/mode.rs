use std::fmt;

use serde::{Deserialize, Serialize};

/// Operating policy modes, ordered from least to most restrictive.
///
/// Variant order is the escalation order: the derived `Ord` is the lattice.
/// A run's active mode only ever moves forward in this order, and `Halt` is
/// absorbing — once reached, the control cycle performs no further work.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    /// Full autonomous operation, no overrides.
    #[default]
    Normal,
    /// Advisory mode: recommendations are computed and exposed, never enforced.
    Guided,
    /// Hard enforcement: the execution gate may block actions.
    Enforced,
    /// No further task generation or execution.
    Halt,
}

impl PolicyMode {
    /// Position in the escalation order.
    pub fn rank(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Guided => 1,
            Self::Enforced => 2,
            Self::Halt => 3,
        }
    }

    pub fn is_halt(self) -> bool {
        self == Self::Halt
    }
}

impl fmt::Display for PolicyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Normal => "normal",
            Self::Guided => "guided",
            Self::Enforced => "enforced",
            Self::Halt => "halt",
        };
        write!(f, "{}", s)
    }
}
