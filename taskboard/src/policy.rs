//! Move/transition policy: whether a task may change column.
//!
//! A single swappable predicate selected via configuration; the rest of
//! the engine is agnostic to which policy is active. Denial is surfaced
//! as a user-visible notice and leaves the task untouched.

use std::fmt;
use std::str::FromStr;

use taskboard_model::column::{StatusId, standard_index};

/// The active move policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovePolicy {
    /// A task may only advance to the immediately next standard column
    /// (`todo` → `in-progress` → `review` → `done`). Moves involving
    /// custom columns are denied in both directions.
    #[default]
    ForwardOnly,
    /// Any move between known columns is allowed.
    Unrestricted,
}

impl MovePolicy {
    /// Whether a move from `from` to `to` is allowed.
    #[must_use]
    pub fn allows(self, from: &StatusId, to: &StatusId) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::ForwardOnly => match (standard_index(from), standard_index(to)) {
                (Some(current), Some(target)) => target == current + 1,
                _ => false,
            },
        }
    }
}

impl fmt::Display for MovePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForwardOnly => write!(f, "forward-only"),
            Self::Unrestricted => write!(f, "unrestricted"),
        }
    }
}

/// Error returned when parsing an unknown policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown move policy: {0} (expected \"forward-only\" or \"unrestricted\")")]
pub struct ParsePolicyError(pub String);

impl FromStr for MovePolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward-only" => Ok(Self::ForwardOnly),
            "unrestricted" => Ok(Self::Unrestricted),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}
