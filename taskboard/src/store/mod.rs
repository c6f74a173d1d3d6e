//! Storage collaborator seams for the board engine.
//!
//! Defines the traits the engine talks to instead of concrete backends:
//! - [`RemoteStore`] — a path-addressed realtime document tree
//!   (`set` / `once` / `subscribe` / `remove`)
//! - [`LocalStore`] — synchronous per-device key-value storage
//! - [`Confirm`] — yes/no prompt gate for destructive operations
//!
//! The in-process reference backend lives in [`memory`].

pub mod memory;

use serde_json::Value;
use tokio::sync::mpsc;

/// Errors that can occur talking to a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend rejected an operation on the given path.
    #[error("remote store rejected operation at {0}")]
    Rejected(String),

    /// The backend connection has been closed.
    #[error("remote store connection closed")]
    Closed,

    /// A stored document could not be decoded.
    #[error("malformed document at {path}: {source}")]
    Malformed {
        /// Path of the offending document.
        path: String,
        /// Underlying decode error.
        source: serde_json::Error,
    },
}

/// Path-addressed realtime document store.
///
/// Models the remote collaborator: a JSON tree where every node is
/// addressable by a `/`-separated path. Writes anywhere at or below a
/// subscribed path re-deliver the current value at the subscription
/// root, so a single-field write to
/// `users/{u}/tasks/{t}/status` notifies watchers of `users/{u}/tasks`.
pub trait RemoteStore: Send + Sync {
    /// Writes `value` at `path`, replacing whatever was there.
    fn set(
        &self,
        path: &str,
        value: Value,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Point-in-time read of the value at `path` (`None` when absent).
    fn once(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Option<Value>, StoreError>> + Send;

    /// Subscribes to value-change notifications for `path`.
    ///
    /// Each notification carries the full current value at `path`.
    fn subscribe(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<mpsc::Receiver<Value>, StoreError>> + Send;

    /// Removes the value at `path`, if any.
    fn remove(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

/// Per-device persistent key-value storage.
///
/// Writes are synchronous and atomic from the caller's perspective.
pub trait LocalStore: Send + Sync {
    /// Reads the value stored under `key`, if any.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str);
}

/// Synchronous yes/no confirmation gate.
///
/// Called before every destructive operation (task delete, user delete
/// with tasks, column delete with tasks). A `false` answer aborts the
/// operation with no side effects.
pub trait Confirm: Send + Sync {
    /// Asks the user `prompt`; returns whether they confirmed.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Remote store paths used by the engine.
pub mod paths {
    use taskboard_model::task::TaskId;
    use taskboard_model::user::UserId;

    /// The user directory root: one child node per user id, holding the
    /// profile fields and the task collection.
    pub const USERS: &str = "users";

    /// Transient health-check key, written then removed at startup.
    pub const TEST_CONNECTION: &str = "test_connection";

    /// A user's whole node: profile fields plus the task collection.
    ///
    /// Removed as one write when the user is deleted; never written
    /// whole, since that would clobber the task collection beneath it.
    #[must_use]
    pub fn user_node(user: &UserId) -> String {
        format!("users/{user}")
    }

    /// A user's display-name field.
    #[must_use]
    pub fn user_name(user: &UserId) -> String {
        format!("users/{user}/name")
    }

    /// A user's avatar field.
    #[must_use]
    pub fn user_avatar(user: &UserId) -> String {
        format!("users/{user}/avatar")
    }

    /// A user's task collection: map of task id to task document.
    #[must_use]
    pub fn user_tasks(user: &UserId) -> String {
        format!("users/{user}/tasks")
    }

    /// The status field of a single task (single-field move writes).
    #[must_use]
    pub fn task_status(user: &UserId, task: &TaskId) -> String {
        format!("users/{user}/tasks/{task}/status")
    }
}

/// Local store keys used by the engine.
pub mod keys {
    /// Active user id, persisted across restarts.
    pub const CURRENT_USER: &str = "currentUser";

    /// Serialized custom column sequence.
    pub const CUSTOM_COLUMNS: &str = "customColumns";

    /// Per-device identifier, generated once.
    pub const DEVICE_ID: &str = "deviceId";
}
