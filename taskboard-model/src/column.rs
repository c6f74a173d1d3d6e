//! Workflow column (stage) types.
//!
//! A column is one lane of the board, identified by a [`StatusId`] that is
//! also the value stored in `Task.status`. The four standard columns are
//! built in, fixed in order, and never deletable; custom columns are
//! user-created and always displayed before the standard ones.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Column identifier, shared with `Task.status`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusId(String);

impl StatusId {
    /// Creates a `StatusId` from an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a column is built in or user created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnOrigin {
    /// One of the four fixed built-in columns.
    Standard,
    /// User-created column: reorderable and deletable.
    Custom,
}

/// One lane of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Unique identifier across standard and custom columns.
    pub status: StatusId,
    /// Display label.
    pub name: String,
    /// Presentational icon token.
    pub icon: String,
    /// Standard or custom.
    pub origin: ColumnOrigin,
}

impl Column {
    /// Creates a custom column with the given identifier, label and icon.
    pub fn custom(status: StatusId, name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            status,
            name: name.into(),
            icon: icon.into(),
            origin: ColumnOrigin::Custom,
        }
    }
}

/// Standard column identifiers in their fixed board order.
pub const STANDARD_ORDER: [&str; 4] = ["todo", "in-progress", "review", "done"];

/// The four built-in columns in fixed order.
#[must_use]
pub fn standard_columns() -> Vec<Column> {
    let labels = [
        ("todo", "To Do", "📋"),
        ("in-progress", "In Progress", "⚡"),
        ("review", "Review", "🔍"),
        ("done", "Done", "✅"),
    ];
    labels
        .into_iter()
        .map(|(status, name, icon)| Column {
            status: StatusId::new(status),
            name: name.to_string(),
            icon: icon.to_string(),
            origin: ColumnOrigin::Standard,
        })
        .collect()
}

/// Position of a status in the fixed standard order, if it is standard.
#[must_use]
pub fn standard_index(status: &StatusId) -> Option<usize> {
    STANDARD_ORDER.iter().position(|s| *s == status.as_str())
}
