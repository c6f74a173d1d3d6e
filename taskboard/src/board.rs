//! Board coordinator: owns the whole application state and reconciles
//! local mutations with the remote realtime store.
//!
//! All state lives in one [`Board`] value — topology, user directory,
//! task collections, policy, active selections — and every mutation goes
//! through its methods. Remote change notifications are funneled through
//! a single [`RemoteChange`] channel and applied one at a time by the
//! caller's single-threaded loop, so in-memory collections never race.
//!
//! Consistency is last-write-wins per user collection: whichever write
//! (local save or remote snapshot) lands in memory last wins, with no
//! version reconciliation. Two devices editing the same user's tasks
//! concurrently can clobber each other; that gap is accepted.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use serde_json::Value;
use tokio::sync::mpsc;

use taskboard_model::column::{Column, StatusId};
use taskboard_model::task::{OwnedTask, Task, TaskId, TaskPatch};
use taskboard_model::user::{DEFAULT_USER, UserId, UserProfile};

use crate::columns::{ColumnError, Topology};
use crate::config::BoardConfig;
use crate::policy::MovePolicy;
use crate::store::{Confirm, LocalStore, RemoteStore, StoreError, keys, paths};
use crate::tasks::{NewTask, TaskError, TaskRepository, decode_collection};
use crate::users::{UserDirectory, UserError};

/// Which board tab is active. Not persisted across restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// The active user's own tasks.
    #[default]
    Personal,
    /// The merged view across every user.
    All,
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// An operation completed.
    Success,
    /// An operation was rejected or failed.
    Error,
    /// Informational (remote update, user switch).
    Info,
}

/// A non-blocking user-facing notice (toast stand-in).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub kind: NoticeKind,
    /// Display text.
    pub text: String,
}

/// A remote push notification: the full task collection snapshot for one
/// user, tagged with the user it was issued for.
#[derive(Debug)]
pub struct RemoteChange {
    /// Owner of the notified collection.
    pub user: UserId,
    /// Snapshot of `users/{user}/tasks` (`Null` when removed).
    pub snapshot: Value,
}

/// Task form mode: creating a new task or editing an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMode {
    /// The form will create a new task on submit.
    Create,
    /// The form will patch the given task on submit.
    Edit(TaskId),
}

/// Errors surfaced by board operations.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// Workflow topology error.
    #[error(transparent)]
    Column(#[from] ColumnError),
    /// User directory error.
    #[error(transparent)]
    User(#[from] UserError),
    /// Task repository or policy error.
    #[error(transparent)]
    Task(#[from] TaskError),
    /// Storage backend error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The board coordinator.
///
/// Generic over the three external collaborators: the remote realtime
/// store, the per-device local store, and the confirmation gate.
pub struct Board<R: RemoteStore, L: LocalStore, C: Confirm> {
    remote: R,
    local: L,
    confirm: C,
    topology: Topology,
    directory: UserDirectory,
    repo: TaskRepository,
    policy: MovePolicy,
    active_user: UserId,
    active_tab: Tab,
    editing: Option<EditMode>,
    notices: mpsc::Sender<Notice>,
    change_tx: mpsc::Sender<RemoteChange>,
    watchers: HashMap<UserId, tokio::task::JoinHandle<()>>,
}

impl<R: RemoteStore, L: LocalStore, C: Confirm> Board<R, L, C> {
    /// Creates a board over the given collaborators.
    ///
    /// Returns the board plus the notice and remote-change receivers. The
    /// caller drains the change receiver and feeds each event to
    /// [`apply_remote_change`](Self::apply_remote_change) — one at a time,
    /// on the same logical thread as every other board call.
    pub fn new(
        remote: R,
        local: L,
        confirm: C,
        config: &BoardConfig,
    ) -> (Self, mpsc::Receiver<Notice>, mpsc::Receiver<RemoteChange>) {
        let (notice_tx, notice_rx) = mpsc::channel(config.notice_buffer);
        let (change_tx, change_rx) = mpsc::channel(config.channel_capacity);
        let board = Self {
            remote,
            local,
            confirm,
            topology: Topology::new(),
            directory: UserDirectory::with_builtins(),
            repo: TaskRepository::new(),
            policy: config.move_policy,
            active_user: UserId::new(DEFAULT_USER),
            active_tab: Tab::default(),
            editing: None,
            notices: notice_tx,
            change_tx,
            watchers: HashMap::new(),
        };
        (board, notice_rx, change_rx)
    }

    // -----------------------------------------------------------------
    // Startup
    // -----------------------------------------------------------------

    /// Loads all state and subscribes to every known user's change feed.
    ///
    /// Remote failures are logged and surfaced as notices; the board
    /// always comes up usable with the seeded built-in users.
    pub async fn init(&mut self) {
        self.check_connection().await;
        self.ensure_device_id();
        self.topology = Topology::load(&self.local);
        self.load_users().await;
        self.load_active_user();
        self.reload_own_tasks().await;
        self.reload_all_tasks().await;
        self.subscribe_known_users().await;
    }

    /// Writes then removes a transient health-check key to confirm
    /// connectivity, surfacing the outcome as a notice.
    async fn check_connection(&self) {
        let probe = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "message": "connection probe",
        });
        let outcome = async {
            self.remote.set(paths::TEST_CONNECTION, probe).await?;
            self.remote.remove(paths::TEST_CONNECTION).await
        }
        .await;
        match outcome {
            Ok(()) => self.notify(NoticeKind::Success, "Connected to the remote store"),
            Err(e) => {
                tracing::warn!(error = %e, "remote store connectivity check failed");
                self.notify(NoticeKind::Error, "Remote store connection failed");
            }
        }
    }

    /// Generates the per-device identifier on first run.
    fn ensure_device_id(&self) {
        if self.local.get_item(keys::DEVICE_ID).is_none() {
            let millis = Utc::now().timestamp_millis();
            let id = format!("device_{millis}_{:x}", rand::random::<u64>());
            self.local.set_item(keys::DEVICE_ID, &id);
        }
    }

    /// Restores the locally persisted active user, if still known.
    fn load_active_user(&mut self) {
        if let Some(saved) = self.local.get_item(keys::CURRENT_USER) {
            let saved = UserId::new(saved);
            if self.directory.contains(&saved) {
                self.active_user = saved;
            }
        }
    }

    /// Fetches the remote user directory and merges it into the local
    /// set. Failure leaves the seeded built-in users usable.
    ///
    /// Entries are decoded one at a time: a child node without profile
    /// fields (for example one holding only a task collection) is
    /// skipped without dropping the rest of the directory.
    async fn load_users(&mut self) {
        match self.remote.once(paths::USERS).await {
            Ok(Some(Value::Object(entries))) => {
                let mut fetched = HashMap::new();
                for (id, raw) in entries {
                    match serde_json::from_value::<UserProfile>(raw) {
                        Ok(profile) => {
                            fetched.insert(UserId::new(id), profile);
                        }
                        Err(e) => {
                            tracing::debug!(user = %id, error = %e, "skipping undecodable user entry");
                        }
                    }
                }
                self.directory.merge_remote(fetched);
            }
            Ok(Some(_)) => tracing::warn!("unexpected user directory shape"),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "failed to load user directory");
                self.notify(NoticeKind::Error, "Failed to load users; using built-in users");
            }
        }
    }

    /// Subscribes to the task feed of every known user.
    async fn subscribe_known_users(&mut self) {
        for user in self.directory.ids() {
            self.watch_user(user).await;
        }
    }

    /// Subscribes to one user's task feed, forwarding each snapshot as a
    /// tagged [`RemoteChange`] onto the single coordinator queue.
    ///
    /// The forwarder handle is retained so it can be torn down when the
    /// user is deleted; re-watching a user replaces its forwarder.
    async fn watch_user(&mut self, user: UserId) {
        match self.remote.subscribe(&paths::user_tasks(&user)).await {
            Ok(mut rx) => {
                let tx = self.change_tx.clone();
                let feed_user = user.clone();
                let handle = tokio::spawn(async move {
                    while let Some(snapshot) = rx.recv().await {
                        let change = RemoteChange {
                            user: feed_user.clone(),
                            snapshot,
                        };
                        if tx.send(change).await.is_err() {
                            break;
                        }
                    }
                });
                if let Some(previous) = self.watchers.insert(user, handle) {
                    previous.abort();
                }
            }
            Err(e) => {
                tracing::warn!(user = %user, error = %e, "failed to subscribe to task feed");
            }
        }
    }

    // -----------------------------------------------------------------
    // Projections
    // -----------------------------------------------------------------

    /// The active user's id.
    #[must_use]
    pub fn active_user(&self) -> &UserId {
        &self.active_user
    }

    /// The active tab.
    #[must_use]
    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    /// The active user's own tasks.
    #[must_use]
    pub fn own_tasks(&self) -> &[Task] {
        self.repo.list_own(&self.active_user)
    }

    /// The merged "all tasks" projection with owner annotations.
    #[must_use]
    pub fn all_tasks(&self) -> Vec<OwnedTask> {
        self.repo.list_all(&self.directory)
    }

    /// The column sequence in display order.
    #[must_use]
    pub fn columns(&self) -> Vec<&Column> {
        self.topology.columns().collect()
    }

    /// The user directory.
    #[must_use]
    pub fn users(&self) -> &UserDirectory {
        &self.directory
    }

    /// The workflow topology.
    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// The active move policy.
    #[must_use]
    pub fn policy(&self) -> MovePolicy {
        self.policy
    }

    // -----------------------------------------------------------------
    // Reconciliation
    // -----------------------------------------------------------------

    /// Applies one remote push: replaces the notified user's collection
    /// with the snapshot (last-write-wins), then re-aggregates the
    /// merged projection from the remote store.
    ///
    /// Changes for users no longer in the directory (deleted while the
    /// notification was queued) are dropped so they cannot resurrect a
    /// removed collection.
    pub async fn apply_remote_change(&mut self, change: RemoteChange) {
        if !self.directory.contains(&change.user) {
            tracing::debug!(user = %change.user, "dropping change for unknown user");
            return;
        }
        let tasks = decode_collection(&change.snapshot);
        self.repo.replace_collection(change.user, tasks);
        self.reload_all_tasks().await;
        self.notify(NoticeKind::Info, "Board updated from another device");
    }

    /// Reloads the active user's collection from the remote store.
    ///
    /// The fetch is tagged with the user it was issued for; if the
    /// active user changed while the fetch was in flight, the stale
    /// result is discarded.
    async fn reload_own_tasks(&mut self) {
        let issued_for = self.active_user.clone();
        let snapshot = match self.remote.once(&paths::user_tasks(&issued_for)).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(user = %issued_for, error = %e, "failed to load own tasks");
                self.notify(NoticeKind::Error, "Failed to load tasks");
                return;
            }
        };
        if self.active_user != issued_for {
            tracing::debug!(user = %issued_for, "discarding stale task fetch");
            return;
        }
        let tasks = snapshot.as_ref().map(decode_collection).unwrap_or_default();
        self.repo.replace_collection(issued_for, tasks);
    }

    /// Re-aggregates every user's collection from the remote store.
    ///
    /// One fetch per user, joined as a unit; a single user's failure is
    /// logged and isolated (their cached collection is kept), never
    /// aborting the rest of the aggregation.
    async fn reload_all_tasks(&mut self) {
        let users = self.directory.ids();
        let results = {
            let remote = &self.remote;
            futures_util::future::join_all(users.iter().map(|user| async move {
                (user.clone(), remote.once(&paths::user_tasks(user)).await)
            }))
            .await
        };
        for (user, result) in results {
            match result {
                Ok(snapshot) => {
                    let tasks = snapshot.as_ref().map(decode_collection).unwrap_or_default();
                    self.repo.replace_collection(user, tasks);
                }
                Err(e) => {
                    tracing::warn!(user = %user, error = %e, "failed to load tasks for user");
                }
            }
        }
    }

    /// Persists a user's whole collection as one remote write.
    async fn persist_collection(&self, user: &UserId) {
        let value = self.repo.collection_value(user);
        if let Err(e) = self.remote.set(&paths::user_tasks(user), value).await {
            tracing::warn!(user = %user, error = %e, "failed to persist task collection");
            self.notify(NoticeKind::Error, "Failed to sync tasks to the remote store");
        }
    }

    /// Persists one user's profile as per-field writes.
    ///
    /// The `users/{id}` node also holds the task collection, so the
    /// profile must never be written as a whole node: only the `name`
    /// and `avatar` fields are set, leaving sibling data untouched.
    async fn persist_profile(&self, user: &UserId) {
        let Some(profile) = self.directory.get(user) else {
            return;
        };
        let name = Value::String(profile.name.clone());
        let avatar = Value::String(profile.avatar.clone());
        let outcome = async {
            self.remote.set(&paths::user_name(user), name).await?;
            self.remote.set(&paths::user_avatar(user), avatar).await
        }
        .await;
        if let Err(e) = outcome {
            tracing::warn!(user = %user, error = %e, "failed to persist user profile");
            self.notify(NoticeKind::Error, "Failed to sync users to the remote store");
        }
    }

    // -----------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------

    /// Switches the active user, persisting the selection and reloading
    /// both projections.
    ///
    /// # Errors
    ///
    /// [`UserError::NotFound`] when `user` is unknown.
    pub async fn switch_user(&mut self, user: UserId) -> Result<(), BoardError> {
        if !self.directory.contains(&user) {
            return Err(UserError::NotFound(user.to_string()).into());
        }
        if user == self.active_user {
            return Ok(());
        }
        let name = self
            .directory
            .get(&user)
            .map_or_else(String::new, |p| p.name.clone());
        self.activate(user).await;
        self.notify(NoticeKind::Info, format!("Switched to user: {name}"));
        Ok(())
    }

    /// Switches the active tab. The `All` tab re-aggregates remotely
    /// before returning; `Personal` renders from in-memory state.
    pub async fn switch_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
        if tab == Tab::All {
            self.reload_all_tasks().await;
        }
    }

    async fn activate(&mut self, user: UserId) {
        self.active_user = user;
        self.local.set_item(keys::CURRENT_USER, self.active_user.as_str());
        self.reload_own_tasks().await;
        self.reload_all_tasks().await;
    }

    // -----------------------------------------------------------------
    // Task operations
    // -----------------------------------------------------------------

    /// Creates a task in the active user's collection and persists it.
    ///
    /// # Errors
    ///
    /// [`TaskError::TitleEmpty`] for a blank title,
    /// [`TaskError::UnknownStatus`] when the target column does not
    /// exist in the current topology.
    pub async fn create_task(&mut self, new: NewTask) -> Result<Task, BoardError> {
        if !self.topology.is_known(&new.status) {
            let err = TaskError::UnknownStatus(new.status.to_string());
            self.notify(NoticeKind::Error, err.to_string());
            return Err(err.into());
        }
        let owner = self.active_user.clone();
        let task = match self.repo.create(&owner, new) {
            Ok(task) => task,
            Err(e) => {
                self.notify(NoticeKind::Error, e.to_string());
                return Err(e.into());
            }
        };
        self.persist_collection(&owner).await;
        self.notify(NoticeKind::Success, "Task created");
        Ok(task)
    }

    /// Patches one of the active user's tasks and persists the
    /// collection. Tasks of other users cannot be edited.
    ///
    /// # Errors
    ///
    /// [`TaskError::NotOwner`] when `owner` is not the active user,
    /// [`TaskError::NotFound`] / [`TaskError::TitleEmpty`] /
    /// [`TaskError::UnknownStatus`] per validation.
    pub async fn update_task(
        &mut self,
        owner: &UserId,
        task: &TaskId,
        patch: TaskPatch,
    ) -> Result<Task, BoardError> {
        if *owner != self.active_user {
            self.notify(NoticeKind::Error, "You can only edit your own tasks");
            return Err(TaskError::NotOwner.into());
        }
        if let Some(status) = &patch.status {
            if !self.topology.is_known(status) {
                let err = TaskError::UnknownStatus(status.to_string());
                self.notify(NoticeKind::Error, err.to_string());
                return Err(err.into());
            }
        }
        let updated = match self.repo.update(owner, task, patch) {
            Ok(task) => task,
            Err(e) => {
                self.notify(NoticeKind::Error, e.to_string());
                return Err(e.into());
            }
        };
        self.persist_collection(owner).await;
        self.notify(NoticeKind::Success, "Task updated");
        Ok(updated)
    }

    /// Deletes one of the active user's tasks after confirmation.
    ///
    /// A declined confirmation aborts with no side effects and returns
    /// `Ok`.
    ///
    /// # Errors
    ///
    /// [`TaskError::NotOwner`] when `owner` is not the active user,
    /// [`TaskError::NotFound`] when the task is absent.
    pub async fn delete_task(&mut self, owner: &UserId, task: &TaskId) -> Result<(), BoardError> {
        if *owner != self.active_user {
            self.notify(NoticeKind::Error, "You can only delete your own tasks");
            return Err(TaskError::NotOwner.into());
        }
        let title = self
            .repo
            .find(owner, task)
            .ok_or_else(|| TaskError::NotFound(task.to_string()))?
            .title
            .clone();
        if !self.confirm.confirm(&format!("Delete task {title:?}?")) {
            return Ok(());
        }
        self.repo.delete(owner, task)?;
        self.persist_collection(owner).await;
        self.notify(NoticeKind::Success, "Task deleted");
        Ok(())
    }

    /// Moves a task to another column, subject to the active policy.
    ///
    /// Any user's task can be moved. For the active user's own tasks the
    /// whole collection is persisted; for other users' tasks only the
    /// status field is written remotely, since the full collection may
    /// not be authoritative on this device.
    ///
    /// # Errors
    ///
    /// [`TaskError::NotFound`], [`TaskError::UnknownStatus`], or
    /// [`TaskError::MoveDenied`] (surfaced as a rejection notice; the
    /// task's status is unchanged).
    pub async fn move_task(
        &mut self,
        owner: &UserId,
        task: &TaskId,
        to: StatusId,
    ) -> Result<(), BoardError> {
        let current = self
            .repo
            .find(owner, task)
            .ok_or_else(|| TaskError::NotFound(task.to_string()))?
            .status
            .clone();
        if !self.topology.is_known(&to) {
            let err = TaskError::UnknownStatus(to.to_string());
            self.notify(NoticeKind::Error, err.to_string());
            return Err(err.into());
        }
        if !self.policy.allows(&current, &to) {
            self.notify(NoticeKind::Error, "Tasks can only move to the next stage");
            return Err(TaskError::MoveDenied {
                from: current.to_string(),
                to: to.to_string(),
            }
            .into());
        }

        self.repo.set_status(owner, task, to.clone())?;
        if *owner == self.active_user {
            self.persist_collection(owner).await;
        } else if let Err(e) = self
            .remote
            .set(&paths::task_status(owner, task), Value::String(to.to_string()))
            .await
        {
            tracing::warn!(user = %owner, task = %task, error = %e, "failed to persist move");
            self.notify(NoticeKind::Error, "Failed to move the task");
            return Err(e.into());
        }
        self.notify(NoticeKind::Success, "Task moved");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Task form state
    // -----------------------------------------------------------------

    /// Opens the task form in create mode.
    pub fn begin_create(&mut self) {
        self.editing = Some(EditMode::Create);
    }

    /// Opens the task form in edit mode for `task`.
    pub fn begin_edit(&mut self, task: TaskId) {
        self.editing = Some(EditMode::Edit(task));
    }

    /// Closes the task form without submitting.
    pub fn cancel_form(&mut self) {
        self.editing = None;
    }

    /// The current form mode, if the form is open.
    #[must_use]
    pub fn editing(&self) -> Option<&EditMode> {
        self.editing.as_ref()
    }

    /// Submits the task form: creates a task, or patches the task being
    /// edited, depending on the form mode. Closes the form on success.
    ///
    /// # Errors
    ///
    /// Propagates [`create_task`](Self::create_task) /
    /// [`update_task`](Self::update_task) errors; the form stays open.
    pub async fn submit_form(&mut self, form: NewTask) -> Result<Task, BoardError> {
        let result = match self.editing.clone() {
            Some(EditMode::Edit(task)) => {
                let patch = TaskPatch {
                    title: Some(form.title),
                    description: Some(form.description),
                    priority: Some(form.priority),
                    status: Some(form.status),
                };
                let owner = self.active_user.clone();
                self.update_task(&owner, &task, patch).await
            }
            _ => self.create_task(form).await,
        };
        if result.is_ok() {
            self.editing = None;
        }
        result
    }

    // -----------------------------------------------------------------
    // User operations
    // -----------------------------------------------------------------

    /// Adds a user, persists their profile remotely, subscribes to the
    /// new user's feed, and makes them active.
    ///
    /// # Errors
    ///
    /// [`UserError::NameEmpty`] / [`UserError::NameTaken`] per
    /// validation.
    pub async fn add_user(&mut self, name: &str, avatar: &str) -> Result<UserId, BoardError> {
        let id = match self.directory.add(name, avatar) {
            Ok(id) => id,
            Err(e) => {
                self.notify(NoticeKind::Error, e.to_string());
                return Err(e.into());
            }
        };
        self.persist_profile(&id).await;
        self.watch_user(id.clone()).await;
        self.activate(id.clone()).await;
        self.notify(NoticeKind::Success, format!("User added: {name}"));
        Ok(id)
    }

    /// Deletes a user, cascading to their tasks after confirmation.
    ///
    /// If the removed user was active, any remaining user becomes
    /// active; if none remain, a placeholder default user is created so
    /// the board is never left without an active user. A declined
    /// confirmation aborts with no side effects.
    ///
    /// # Errors
    ///
    /// [`UserError::NotFound`] when `user` is unknown.
    pub async fn delete_user(&mut self, user: &UserId) -> Result<(), BoardError> {
        let name = self
            .directory
            .get(user)
            .ok_or_else(|| UserError::NotFound(user.to_string()))?
            .name
            .clone();
        let owned = self.owned_task_count(user).await;
        if owned > 0 {
            let prompt = format!("Delete user {name:?} and their {owned} task(s)?");
            if !self.confirm.confirm(&prompt) {
                return Ok(());
            }
        }

        self.directory.remove(user)?;
        self.repo.remove_collection(user);
        if let Some(watcher) = self.watchers.remove(user) {
            watcher.abort();
        }
        // One write drops the profile fields and the task collection.
        if let Err(e) = self.remote.remove(&paths::user_node(user)).await {
            tracing::warn!(user = %user, error = %e, "failed to remove remote user node");
            self.notify(NoticeKind::Error, "Failed to remove the user from the remote store");
        }

        if self.directory.is_empty() {
            let placeholder = self.directory.insert_placeholder();
            self.persist_profile(&placeholder).await;
            self.watch_user(placeholder).await;
        }

        if *user == self.active_user {
            if let Some(next) = self.directory.any_id() {
                self.activate(next).await;
            }
        }
        self.notify(NoticeKind::Success, format!("User deleted: {name}"));
        Ok(())
    }

    /// Counts a user's tasks from the remote store, the authority for
    /// the cascade confirmation: the cached collection may be empty
    /// just because its fetch failed. The cache is the fallback only
    /// when the remote count itself cannot be read.
    async fn owned_task_count(&self, user: &UserId) -> usize {
        match self.remote.once(&paths::user_tasks(user)).await {
            Ok(Some(snapshot)) => decode_collection(&snapshot).len(),
            Ok(None) => 0,
            Err(e) => {
                tracing::warn!(user = %user, error = %e, "failed to count tasks before deletion");
                self.repo.list_own(user).len()
            }
        }
    }

    // -----------------------------------------------------------------
    // Column operations
    // -----------------------------------------------------------------

    /// Adds a custom column (status derived from the name) ahead of the
    /// standard columns.
    ///
    /// # Errors
    ///
    /// Propagates [`ColumnError`] validation failures.
    pub fn add_column(&mut self, name: &str, icon: &str) -> Result<Column, BoardError> {
        match self.topology.add_custom(&self.local, name, icon) {
            Ok(column) => {
                self.notify(NoticeKind::Success, format!("Column added: {}", column.name));
                Ok(column)
            }
            Err(e) => {
                self.notify(NoticeKind::Error, e.to_string());
                Err(e.into())
            }
        }
    }

    /// Deletes a custom column, cascading to every task in it (across
    /// all users) after confirmation. A declined confirmation leaves the
    /// column and its tasks untouched.
    ///
    /// # Errors
    ///
    /// [`ColumnError::NotCustom`] for standard columns,
    /// [`ColumnError::NotFound`] for unknown ones.
    pub async fn delete_column(&mut self, status: &StatusId) -> Result<(), BoardError> {
        // Validate before cascading so a bad status deletes nothing.
        match self.topology.get(status) {
            Some(column) if column.origin == taskboard_model::column::ColumnOrigin::Custom => {}
            Some(_) => {
                let err = ColumnError::NotCustom(status.to_string());
                self.notify(NoticeKind::Error, err.to_string());
                return Err(err.into());
            }
            None => return Err(ColumnError::NotFound(status.to_string()).into()),
        }

        let affected = self.repo.tasks_in_column(status);
        if !affected.is_empty() {
            let prompt = format!(
                "Delete column {:?} and {} task(s) in it?",
                status.as_str(),
                affected.len()
            );
            if !self.confirm.confirm(&prompt) {
                self.notify(NoticeKind::Info, "Column deletion cancelled");
                return Ok(());
            }
            let mut touched: BTreeSet<UserId> = BTreeSet::new();
            for (owner, task) in affected {
                if self.repo.delete(&owner, &task).is_ok() {
                    touched.insert(owner);
                }
            }
            for owner in touched {
                self.persist_collection(&owner).await;
            }
        }

        let removed = self.topology.remove_custom(&self.local, status)?;
        self.notify(NoticeKind::Success, format!("Column deleted: {}", removed.name));
        Ok(())
    }

    /// Moves a custom column to a new position among the custom columns.
    pub fn reorder_column(&mut self, from: usize, to: usize) {
        self.topology.reorder_custom(&self.local, from, to);
    }

    // -----------------------------------------------------------------

    fn notify(&self, kind: NoticeKind, text: impl Into<String>) {
        let notice = Notice {
            kind,
            text: text.into(),
        };
        if self.notices.try_send(notice).is_err() {
            tracing::debug!("notice receiver lagging or gone");
        }
    }
}
