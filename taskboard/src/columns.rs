//! Workflow topology store: the ordered set of board columns.
//!
//! Custom columns always precede the four standard columns. Every
//! mutation persists the full custom sequence to local storage as one
//! write, so no partial-write state is observable across restarts.

use taskboard_model::column::{Column, StatusId, standard_columns};
use taskboard_model::slug::slugify;

use crate::store::{LocalStore, keys};

/// Errors from workflow topology operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColumnError {
    /// Column name cannot be empty.
    #[error("column name cannot be empty")]
    NameEmpty,

    /// Slugification of the name produced nothing usable.
    #[error("column name {0:?} does not produce a valid identifier")]
    EmptySlug(String),

    /// The derived status collides with an existing column.
    #[error("a column with status {0:?} already exists")]
    StatusTaken(String),

    /// The status names a standard column, which cannot be removed.
    #[error("column {0:?} is standard and cannot be deleted")]
    NotCustom(String),

    /// No column with the given status exists.
    #[error("column not found: {0}")]
    NotFound(String),
}

/// The ordered list of board columns: user-created custom columns first,
/// then the fixed standard four.
pub struct Topology {
    custom: Vec<Column>,
    standard: Vec<Column>,
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}

impl Topology {
    /// Creates a topology with no custom columns.
    #[must_use]
    pub fn new() -> Self {
        Self {
            custom: Vec::new(),
            standard: standard_columns(),
        }
    }

    /// Loads the persisted custom column sequence from local storage.
    ///
    /// Absent or corrupt data falls back to an empty custom list; corrupt
    /// data is logged and discarded rather than crashing the board.
    pub fn load(local: &impl LocalStore) -> Self {
        let custom = match local.get_item(keys::CUSTOM_COLUMNS) {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<Column>>(&raw) {
                Ok(columns) => columns,
                Err(e) => {
                    tracing::warn!(error = %e, "discarding corrupt custom column data");
                    Vec::new()
                }
            },
        };
        Self {
            custom,
            standard: standard_columns(),
        }
    }

    /// All columns in display order: custom first, then standard.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.custom.iter().chain(self.standard.iter())
    }

    /// The custom columns in their stored order.
    #[must_use]
    pub fn custom_columns(&self) -> &[Column] {
        &self.custom
    }

    /// Whether `status` names a current column (standard or custom).
    #[must_use]
    pub fn is_known(&self, status: &StatusId) -> bool {
        self.columns().any(|c| c.status == *status)
    }

    /// Looks up a column by status.
    #[must_use]
    pub fn get(&self, status: &StatusId) -> Option<&Column> {
        self.columns().find(|c| c.status == *status)
    }

    /// Adds a custom column, deriving its status from `name`.
    ///
    /// The new column is prepended to the custom sequence and the full
    /// sequence is persisted.
    ///
    /// # Errors
    ///
    /// [`ColumnError::NameEmpty`] for a blank name, [`ColumnError::EmptySlug`]
    /// when slugification yields nothing, [`ColumnError::StatusTaken`] when
    /// the derived status collides with any existing column.
    pub fn add_custom(
        &mut self,
        local: &impl LocalStore,
        name: &str,
        icon: &str,
    ) -> Result<Column, ColumnError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ColumnError::NameEmpty);
        }
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(ColumnError::EmptySlug(name.to_string()));
        }
        let status = StatusId::new(slug);
        if self.is_known(&status) {
            return Err(ColumnError::StatusTaken(status.to_string()));
        }

        let column = Column::custom(status, name, icon);
        self.custom.insert(0, column.clone());
        self.persist(local);
        Ok(column)
    }

    /// Removes a custom column and persists the sequence.
    ///
    /// Task cascade for non-empty columns is the coordinator's concern;
    /// this only mutates the topology.
    ///
    /// # Errors
    ///
    /// [`ColumnError::NotCustom`] when `status` names a standard column,
    /// [`ColumnError::NotFound`] when no such column exists.
    pub fn remove_custom(
        &mut self,
        local: &impl LocalStore,
        status: &StatusId,
    ) -> Result<Column, ColumnError> {
        if self.standard.iter().any(|c| c.status == *status) {
            return Err(ColumnError::NotCustom(status.to_string()));
        }
        let index = self
            .custom
            .iter()
            .position(|c| c.status == *status)
            .ok_or_else(|| ColumnError::NotFound(status.to_string()))?;
        let removed = self.custom.remove(index);
        self.persist(local);
        Ok(removed)
    }

    /// Moves the custom column at `from` to position `to` within the
    /// custom sequence, clamping `to` into range. Out-of-range `from` is
    /// a no-op. Standard columns are never affected.
    pub fn reorder_custom(&mut self, local: &impl LocalStore, from: usize, to: usize) {
        if from >= self.custom.len() {
            return;
        }
        let column = self.custom.remove(from);
        let to = to.min(self.custom.len());
        self.custom.insert(to, column);
        self.persist(local);
    }

    /// Persists the full custom sequence as a single local write.
    fn persist(&self, local: &impl LocalStore) {
        match serde_json::to_string(&self.custom) {
            Ok(raw) => local.set_item(keys::CUSTOM_COLUMNS, &raw),
            Err(e) => tracing::warn!(error = %e, "failed to serialize custom columns"),
        }
    }
}
