//! Task types for the board.
//!
//! A [`Task`] is owned by exactly one user and lives in that user's
//! collection in the remote store (`users/{userId}/tasks/{taskId}`).
//! The merged "all tasks" view annotates tasks with owner identity via
//! [`OwnedTask`]; that annotation is projection-only and never persisted.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::column::StatusId;
use crate::user::UserId;

/// Unique identifier for a task.
///
/// Generated client-side from the current time in base36 plus a random
/// base36 suffix. Collision probability is negligible for single-board
/// usage; the identifier is not cryptographically unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a `TaskId` from an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh time-based identifier.
    #[must_use]
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let suffix: u64 = rand::random();
        Self(format!("{}{}", to_base36(millis), to_base36(u128::from(suffix))))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Renders a number in lowercase base36 (`[0-9a-z]`).
fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Normal work item.
    Medium,
    /// Should be picked up soon.
    High,
    /// Drop everything.
    Urgent,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Urgent => write!(f, "urgent"),
        }
    }
}

/// Error returned when parsing an unknown priority string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority: {0}")]
pub struct ParsePriorityError(pub String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(ParsePriorityError(other.to_string())),
        }
    }
}

/// A single task as persisted in a user's collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque unique identifier, immutable once created.
    pub id: TaskId,
    /// Non-empty display title.
    pub title: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Task priority.
    pub priority: Priority,
    /// Column identifier in the current workflow topology.
    pub status: StatusId,
    /// Creation timestamp, immutable.
    pub created_at: DateTime<Utc>,
}

/// Partial update applied over an existing task.
///
/// Fields left as `None` are retained from the current task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New title, if changing.
    pub title: Option<String>,
    /// New description (`Some(None)` clears it).
    pub description: Option<Option<String>>,
    /// New priority, if changing.
    pub priority: Option<Priority>,
    /// New status, if changing.
    pub status: Option<StatusId>,
}

impl TaskPatch {
    /// Merges this patch over `task`, leaving unset fields untouched.
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}

/// A task annotated with owner identity for the merged "all tasks" view.
///
/// Derived at projection time from a user's collection plus the user
/// directory. Never written back to the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedTask {
    /// The underlying task.
    pub task: Task,
    /// Identifier of the owning user.
    pub owner: UserId,
    /// Owner display name at projection time.
    pub owner_name: String,
    /// Owner avatar glyph at projection time.
    pub owner_avatar: String,
}
