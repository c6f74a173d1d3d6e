//! In-process storage backends for tests and the headless demo.
//!
//! [`MemoryRemote`] models the remote realtime document store as a JSON
//! tree behind an async lock, with per-path subscriber channels. Cloning
//! a `MemoryRemote` yields a handle to the same tree, so two boards
//! sharing one clone behave like two devices on one realtime database.
//!
//! [`MemoryLocal`] and [`AutoConfirm`] complete the backend set.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::{RwLock, mpsc};

use super::{Confirm, LocalStore, RemoteStore, StoreError};

/// Default subscriber channel capacity.
const DEFAULT_CAPACITY: usize = 64;

struct Subscription {
    path: String,
    tx: mpsc::Sender<Value>,
}

struct Shared {
    tree: RwLock<Value>,
    subs: RwLock<Vec<Subscription>>,
    /// Paths for which every operation fails (failure injection for tests).
    failing: parking_lot::Mutex<HashSet<String>>,
    capacity: usize,
}

/// Shared in-memory realtime document tree.
#[derive(Clone)]
pub struct MemoryRemote {
    shared: Arc<Shared>,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemote {
    /// Creates an empty tree with the default subscriber capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty tree with a custom subscriber channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                tree: RwLock::new(Value::Object(Map::new())),
                subs: RwLock::new(Vec::new()),
                failing: parking_lot::Mutex::new(HashSet::new()),
                capacity,
            }),
        }
    }

    /// Makes every subsequent operation on `path` fail with
    /// [`StoreError::Rejected`]. Used to exercise failure isolation.
    pub fn fail_path(&self, path: &str) {
        self.shared.failing.lock().insert(path.to_string());
    }

    /// Clears a previously injected failure.
    pub fn heal_path(&self, path: &str) {
        self.shared.failing.lock().remove(path);
    }

    fn check_failing(&self, path: &str) -> Result<(), StoreError> {
        if self.shared.failing.lock().contains(path) {
            return Err(StoreError::Rejected(path.to_string()));
        }
        Ok(())
    }

    /// Delivers the current value at every subscription related to
    /// `changed` (same path, ancestor, or descendant).
    async fn notify(&self, changed: &str) {
        let mut deliveries = Vec::new();
        {
            let tree = self.shared.tree.read().await;
            let mut subs = self.shared.subs.write().await;
            subs.retain(|s| !s.tx.is_closed());
            for sub in subs.iter() {
                if paths_related(&sub.path, changed) {
                    let payload = value_at(&tree, &sub.path).cloned().unwrap_or(Value::Null);
                    deliveries.push((sub.tx.clone(), payload));
                }
            }
        }
        for (tx, payload) in deliveries {
            let _ = tx.send(payload).await;
        }
    }
}

impl RemoteStore for MemoryRemote {
    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.check_failing(path)?;
        {
            let mut tree = self.shared.tree.write().await;
            set_at(&mut tree, path, value);
        }
        self.notify(path).await;
        Ok(())
    }

    async fn once(&self, path: &str) -> Result<Option<Value>, StoreError> {
        self.check_failing(path)?;
        let tree = self.shared.tree.read().await;
        Ok(value_at(&tree, path).cloned())
    }

    async fn subscribe(&self, path: &str) -> Result<mpsc::Receiver<Value>, StoreError> {
        self.check_failing(path)?;
        let (tx, rx) = mpsc::channel(self.shared.capacity);
        self.shared.subs.write().await.push(Subscription {
            path: path.to_string(),
            tx,
        });
        Ok(rx)
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        self.check_failing(path)?;
        {
            let mut tree = self.shared.tree.write().await;
            remove_at(&mut tree, path);
        }
        self.notify(path).await;
        Ok(())
    }
}

/// Two paths are related when one addresses a node at or below the other.
fn paths_related(a: &str, b: &str) -> bool {
    a == b
        || a.strip_prefix(b).is_some_and(|rest| rest.starts_with('/'))
        || b.strip_prefix(a).is_some_and(|rest| rest.starts_with('/'))
}

fn value_at<'a>(mut node: &'a Value, path: &str) -> Option<&'a Value> {
    for segment in path.split('/') {
        node = node.as_object()?.get(segment)?;
    }
    Some(node)
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just made an object"),
    }
}

fn set_at(node: &mut Value, path: &str, value: Value) {
    match path.split_once('/') {
        None => {
            ensure_object(node).insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = ensure_object(node)
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            set_at(child, rest, value);
        }
    }
}

fn remove_at(node: &mut Value, path: &str) {
    match path.split_once('/') {
        None => {
            if let Value::Object(map) = node {
                map.remove(path);
            }
        }
        Some((head, rest)) => {
            if let Value::Object(map) = node {
                if let Some(child) = map.get_mut(head) {
                    remove_at(child, rest);
                }
            }
        }
    }
}

/// In-memory per-device key-value store.
#[derive(Clone, Default)]
pub struct MemoryLocal {
    map: Arc<parking_lot::Mutex<std::collections::HashMap<String, String>>>,
}

impl MemoryLocal {
    /// Creates an empty local store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryLocal {
    fn get_item(&self, key: &str) -> Option<String> {
        self.map.lock().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.map.lock().insert(key.to_string(), value.to_string());
    }
}

/// Confirmation gate with a fixed answer.
#[derive(Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}
