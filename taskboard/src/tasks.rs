//! Task repository: per-user task collections and the merged projection.
//!
//! Each user owns exactly one collection; the "all tasks" view is a
//! read-only union derived from the collections plus the user directory,
//! never an independent store. Remote pushes replace whole collections
//! (last-write-wins); persistence back to the remote store is the
//! coordinator's concern.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::Value;
use taskboard_model::column::StatusId;
use taskboard_model::task::{OwnedTask, Priority, Task, TaskId, TaskPatch};
use taskboard_model::user::UserId;

use crate::users::UserDirectory;

/// Errors from task repository operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaskError {
    /// Task title cannot be empty.
    #[error("task title cannot be empty")]
    TitleEmpty,

    /// No task with the given id in the user's collection.
    #[error("task not found: {0}")]
    NotFound(String),

    /// The target status does not name a current column.
    #[error("unknown status: {0}")]
    UnknownStatus(String),

    /// The active move policy rejected the transition.
    #[error("cannot move task from {from:?} to {to:?}")]
    MoveDenied {
        /// Status the task is currently in.
        from: String,
        /// Status the move targeted.
        to: String,
    },

    /// The task belongs to another user.
    #[error("task belongs to another user")]
    NotOwner,
}

/// Fields for a new task, validated on creation.
#[derive(Debug, Clone)]
pub struct NewTask {
    /// Display title (must be non-blank).
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Priority.
    pub priority: Priority,
    /// Initial column.
    pub status: StatusId,
}

/// In-memory task collections, one per known user.
#[derive(Default)]
pub struct TaskRepository {
    collections: HashMap<UserId, Vec<Task>>,
}

impl TaskRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A user's own tasks (empty slice for unknown users).
    #[must_use]
    pub fn list_own(&self, user: &UserId) -> &[Task] {
        self.collections.get(user).map_or(&[], Vec::as_slice)
    }

    /// The merged "all tasks" projection, annotated with owner identity.
    ///
    /// Derived on every call from the collections and the directory;
    /// collections of users no longer in the directory are skipped.
    /// Sorted by creation time (then id) for stable output.
    #[must_use]
    pub fn list_all(&self, directory: &UserDirectory) -> Vec<OwnedTask> {
        let mut all: Vec<OwnedTask> = self
            .collections
            .iter()
            .filter_map(|(user, tasks)| {
                directory.get(user).map(|profile| (user, profile, tasks))
            })
            .flat_map(|(user, profile, tasks)| {
                tasks.iter().map(move |task| OwnedTask {
                    task: task.clone(),
                    owner: user.clone(),
                    owner_name: profile.name.clone(),
                    owner_avatar: profile.avatar.clone(),
                })
            })
            .collect();
        all.sort_by(|a, b| {
            a.task
                .created_at
                .cmp(&b.task.created_at)
                .then_with(|| a.task.id.cmp(&b.task.id))
        });
        all
    }

    /// Looks up a task in a user's collection.
    #[must_use]
    pub fn find(&self, user: &UserId, task: &TaskId) -> Option<&Task> {
        self.list_own(user).iter().find(|t| t.id == *task)
    }

    /// Creates a task in `user`'s collection.
    ///
    /// Stamps a fresh id and creation time; the caller persists the
    /// whole collection afterwards.
    ///
    /// # Errors
    ///
    /// [`TaskError::TitleEmpty`] for a blank title.
    pub fn create(&mut self, user: &UserId, new: NewTask) -> Result<Task, TaskError> {
        if new.title.trim().is_empty() {
            return Err(TaskError::TitleEmpty);
        }
        let task = Task {
            id: TaskId::generate(),
            title: new.title,
            description: new.description.filter(|d| !d.is_empty()),
            priority: new.priority,
            status: new.status,
            created_at: Utc::now(),
        };
        self.collections
            .entry(user.clone())
            .or_default()
            .push(task.clone());
        Ok(task)
    }

    /// Merges `patch` over an existing task (unset fields retained).
    ///
    /// # Errors
    ///
    /// [`TaskError::NotFound`] when the task is absent,
    /// [`TaskError::TitleEmpty`] when the patch blanks the title.
    pub fn update(&mut self, user: &UserId, task: &TaskId, patch: TaskPatch) -> Result<Task, TaskError> {
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(TaskError::TitleEmpty);
        }
        let existing = self.find_mut(user, task)?;
        patch.apply(existing);
        Ok(existing.clone())
    }

    /// Removes a task from `user`'s collection, returning it.
    ///
    /// # Errors
    ///
    /// [`TaskError::NotFound`] when the task is absent.
    pub fn delete(&mut self, user: &UserId, task: &TaskId) -> Result<Task, TaskError> {
        let tasks = self
            .collections
            .get_mut(user)
            .ok_or_else(|| TaskError::NotFound(task.to_string()))?;
        let index = tasks
            .iter()
            .position(|t| t.id == *task)
            .ok_or_else(|| TaskError::NotFound(task.to_string()))?;
        Ok(tasks.remove(index))
    }

    /// Sets only the status of a task (the move path).
    ///
    /// # Errors
    ///
    /// [`TaskError::NotFound`] when the task is absent.
    pub fn set_status(&mut self, user: &UserId, task: &TaskId, status: StatusId) -> Result<(), TaskError> {
        self.find_mut(user, task)?.status = status;
        Ok(())
    }

    /// Replaces `user`'s whole collection with a remote snapshot
    /// (last-write-wins: no field-level reconciliation).
    pub fn replace_collection(&mut self, user: UserId, tasks: Vec<Task>) {
        self.collections.insert(user, tasks);
    }

    /// Drops `user`'s collection entirely (user deletion cascade).
    pub fn remove_collection(&mut self, user: &UserId) {
        self.collections.remove(user);
    }

    /// All `(owner, task id)` pairs currently in `status`, across every
    /// collection. Used for column deletion cascades.
    #[must_use]
    pub fn tasks_in_column(&self, status: &StatusId) -> Vec<(UserId, TaskId)> {
        let mut found: Vec<(UserId, TaskId)> = self
            .collections
            .iter()
            .flat_map(|(user, tasks)| {
                tasks
                    .iter()
                    .filter(|t| t.status == *status)
                    .map(move |t| (user.clone(), t.id.clone()))
            })
            .collect();
        found.sort();
        found
    }

    /// Serializes `user`'s collection as the remote document: a map of
    /// task id to task.
    #[must_use]
    pub fn collection_value(&self, user: &UserId) -> Value {
        let map: serde_json::Map<String, Value> = self
            .list_own(user)
            .iter()
            .filter_map(|task| {
                serde_json::to_value(task)
                    .ok()
                    .map(|v| (task.id.to_string(), v))
            })
            .collect();
        Value::Object(map)
    }

    fn find_mut(&mut self, user: &UserId, task: &TaskId) -> Result<&mut Task, TaskError> {
        self.collections
            .get_mut(user)
            .and_then(|tasks| tasks.iter_mut().find(|t| t.id == *task))
            .ok_or_else(|| TaskError::NotFound(task.to_string()))
    }
}

/// Decodes a remote collection snapshot (map of task id to task) into a
/// task list sorted by creation time.
///
/// `Null`/absent snapshots decode to an empty list; individual malformed
/// entries are logged and skipped rather than poisoning the whole
/// collection.
#[must_use]
pub fn decode_collection(snapshot: &Value) -> Vec<Task> {
    let Some(map) = snapshot.as_object() else {
        return Vec::new();
    };
    let mut tasks: Vec<Task> = map
        .iter()
        .filter_map(|(id, raw)| match serde_json::from_value::<Task>(raw.clone()) {
            Ok(task) => Some(task),
            Err(e) => {
                tracing::warn!(task = %id, error = %e, "skipping malformed task document");
                None
            }
        })
        .collect();
    tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    tasks
}
