//! Owner identity for per-owner settings

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a settings owner
///
/// Used both as the cache key and as the persisted owner reference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for OwnerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for OwnerId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Anything per-owner settings can be attached to (typically a user)
///
/// # Example
///
/// ```rust
/// use scoped_settings::{OwnerId, SettingsOwner};
///
/// struct User {
///     id: u64,
/// }
///
/// impl SettingsOwner for User {
///     fn setting_identifier(&self) -> OwnerId {
///         OwnerId::from(self.id)
///     }
/// }
///
/// assert_eq!(User { id: 7 }.setting_identifier().as_str(), "7");
/// ```
pub trait SettingsOwner {
    /// Identifier that must stay the same for the lifetime of the owner
    fn setting_identifier(&self) -> OwnerId;
}

impl SettingsOwner for OwnerId {
    fn setting_identifier(&self) -> OwnerId {
        self.clone()
    }
}

impl SettingsOwner for String {
    fn setting_identifier(&self) -> OwnerId {
        OwnerId::new(self.as_str())
    }
}
