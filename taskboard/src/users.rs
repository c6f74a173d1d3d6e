//! User directory: the set of known users and their display identities.
//!
//! Mirrored remotely under the `users` path, one `name`/`avatar` pair
//! per user node; seeded with two built-in users so the board works
//! even when the remote directory is empty or unreachable.

use std::collections::HashMap;

use taskboard_model::user::{UserId, UserProfile, builtin_users, derive_user_id};

/// Errors from user directory operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UserError {
    /// User name cannot be empty.
    #[error("user name cannot be empty")]
    NameEmpty,

    /// Another user already has this name (case-insensitive).
    #[error("a user named {0:?} already exists")]
    NameTaken(String),

    /// No user with the given id exists.
    #[error("user not found: {0}")]
    NotFound(String),
}

/// The set of known users, keyed by [`UserId`].
pub struct UserDirectory {
    users: HashMap<UserId, UserProfile>,
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl UserDirectory {
    /// Creates a directory seeded with the two built-in users.
    #[must_use]
    pub fn with_builtins() -> Self {
        Self {
            users: builtin_users().into_iter().collect(),
        }
    }

    /// Creates an empty directory (used when synthesizing a placeholder
    /// after the last user is deleted).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            users: HashMap::new(),
        }
    }

    /// Number of known users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the directory has no users.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Whether `id` names a known user.
    #[must_use]
    pub fn contains(&self, id: &UserId) -> bool {
        self.users.contains_key(id)
    }

    /// Looks up a user's profile.
    #[must_use]
    pub fn get(&self, id: &UserId) -> Option<&UserProfile> {
        self.users.get(id)
    }

    /// All known user ids, sorted for deterministic iteration.
    #[must_use]
    pub fn ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.users.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Any user id, or `None` when the directory is empty.
    #[must_use]
    pub fn any_id(&self) -> Option<UserId> {
        self.ids().into_iter().next()
    }

    /// Iterates over `(id, profile)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&UserId, &UserProfile)> {
        self.users.iter()
    }

    /// Adds a user, deriving a unique id from the display name.
    ///
    /// # Errors
    ///
    /// [`UserError::NameEmpty`] for a blank name, [`UserError::NameTaken`]
    /// when the name is already in use (case-insensitive).
    pub fn add(&mut self, name: &str, avatar: &str) -> Result<UserId, UserError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(UserError::NameEmpty);
        }
        let lowered = name.to_lowercase();
        if self.users.values().any(|p| p.name.to_lowercase() == lowered) {
            return Err(UserError::NameTaken(name.to_string()));
        }

        let id = derive_user_id(name, |candidate| self.users.contains_key(candidate));
        self.users.insert(id.clone(), UserProfile::new(name, avatar));
        Ok(id)
    }

    /// Removes a user, returning their profile.
    ///
    /// # Errors
    ///
    /// [`UserError::NotFound`] when `id` is unknown.
    pub fn remove(&mut self, id: &UserId) -> Result<UserProfile, UserError> {
        self.users
            .remove(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    /// Inserts and returns a placeholder default user.
    ///
    /// Used when the last user is deleted so the board is never left
    /// without users or an active selection.
    pub fn insert_placeholder(&mut self) -> UserId {
        let id = derive_user_id("User", |candidate| self.users.contains_key(candidate));
        self.users.insert(id.clone(), UserProfile::new("User", "👤"));
        id
    }

    /// Merges a remotely fetched user map into the local set.
    ///
    /// Only entries with both a non-empty name and avatar are added or
    /// overwritten; locally known users absent from the remote map are
    /// preserved.
    pub fn merge_remote(&mut self, remote: HashMap<UserId, UserProfile>) {
        for (id, profile) in remote {
            if profile.name.is_empty() || profile.avatar.is_empty() {
                tracing::debug!(user = %id, "skipping incomplete remote user entry");
                continue;
            }
            self.users.insert(id, profile);
        }
    }

}
