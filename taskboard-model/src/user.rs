//! User identity types.
//!
//! The user directory lives at the `users` path of the remote store as a
//! map of [`UserId`] to [`UserProfile`]. Two built-in users are seeded at
//! first run so the board is usable even when the remote directory has
//! never been written (or cannot be reached).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::slug::slugify;

/// Maximum length (in characters) of a derived user identifier stem.
pub const MAX_USER_ID_STEM: usize = 10;

/// Fallback identifier stem when slugification of a name yields nothing.
const FALLBACK_STEM: &str = "user";

/// Stable key identifying a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a `UserId` from an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display identity of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name, unique (case-insensitive) among users.
    pub name: String,
    /// Short glyph/icon token.
    pub avatar: String,
}

impl UserProfile {
    /// Creates a profile from name and avatar.
    pub fn new(name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar: avatar.into(),
        }
    }
}

/// Identifier of the default built-in user, active on first run.
pub const DEFAULT_USER: &str = "maxim";

/// The two built-in users seeded at first run.
#[must_use]
pub fn builtin_users() -> Vec<(UserId, UserProfile)> {
    vec![
        (UserId::new("maxim"), UserProfile::new("Максим", "👨\u{200d}💼")),
        (UserId::new("mark"), UserProfile::new("Марк", "👨\u{200d}💻")),
    ]
}

/// Derives a new user identifier from a display name.
///
/// The name is slugified and truncated to [`MAX_USER_ID_STEM`] characters;
/// if the stem collides with an existing identifier (per `is_taken`), an
/// increasing numeric suffix is appended until it is unique.
pub fn derive_user_id(name: &str, mut is_taken: impl FnMut(&UserId) -> bool) -> UserId {
    let mut stem: String = slugify(name).chars().take(MAX_USER_ID_STEM).collect();
    if stem.is_empty() {
        stem = FALLBACK_STEM.to_string();
    }
    let mut candidate = UserId::new(stem.clone());
    let mut suffix = 1u32;
    while is_taken(&candidate) {
        candidate = UserId::new(format!("{stem}{suffix}"));
        suffix += 1;
    }
    candidate
}
