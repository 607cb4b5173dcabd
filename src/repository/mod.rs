//! Persistence of setting rows
//!
//! The manager talks to its backing store through [`SettingsRepository`]:
//! - **Memory**: in-process rows, with query/commit counters for diagnostics
//! - **JSON file**: all rows in one document, replaced atomically on commit
//!
//! How "find these names for this owner" is expressed is pluggable through
//! [`NameLookup`], so backends without a multi-key query can still be used.

mod json_file;
mod memory;

pub use json_file::JsonFileRepository;
pub use memory::MemoryRepository;

use crate::error::Result;
use crate::owner::OwnerId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A persisted setting value
///
/// One row exists per (name, owner) pair; `owner: None` is the global scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub name: String,
    /// Serialized value
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerId>,
}

impl Setting {
    pub fn new(name: impl Into<String>, owner: Option<OwnerId>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            owner,
        }
    }

    /// Whether this row belongs to the given scope
    pub fn is_owned_by(&self, owner: Option<&OwnerId>) -> bool {
        self.owner.as_ref() == owner
    }
}

/// Rows staged by a flush, committed together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Rows that do not exist yet
    pub inserts: Vec<Setting>,
    /// Existing rows with a new value
    pub updates: Vec<Setting>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inserts.len() + self.updates.len()
    }
}

/// Trait for setting storage backends
pub trait SettingsRepository: Send + Sync {
    /// All rows of one scope
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn find_by_owner(&self, owner: Option<&OwnerId>) -> Result<Vec<Setting>>;

    /// Rows of one scope whose name is any of `names`, in a single query
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn find_by_names(&self, names: &[String], owner: Option<&OwnerId>) -> Result<Vec<Setting>>;

    /// Apply every insert and update, or none of them
    ///
    /// # Errors
    ///
    /// Returns `Error::Repository` if an update targets a missing row or an insert
    /// duplicates an existing (name, owner) pair; backend errors otherwise.
    fn commit(&self, changes: ChangeSet) -> Result<()>;

    /// Backend name for logging/debugging
    fn backend_name(&self) -> &'static str;
}

impl<T: SettingsRepository + ?Sized> SettingsRepository for Arc<T> {
    fn find_by_owner(&self, owner: Option<&OwnerId>) -> Result<Vec<Setting>> {
        (**self).find_by_owner(owner)
    }

    fn find_by_names(&self, names: &[String], owner: Option<&OwnerId>) -> Result<Vec<Setting>> {
        (**self).find_by_names(names, owner)
    }

    fn commit(&self, changes: ChangeSet) -> Result<()> {
        (**self).commit(changes)
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}

// =============================================================================
// Name Lookup Strategies
// =============================================================================

/// Strategy for fetching the existing rows a flush is about to overwrite
pub trait NameLookup: Send + Sync {
    /// Find the rows of `owner` named in `names`
    ///
    /// # Errors
    ///
    /// Returns repository errors unchanged.
    fn find_by_names(
        &self,
        repository: &dyn SettingsRepository,
        names: &[String],
        owner: Option<&OwnerId>,
    ) -> Result<Vec<Setting>>;
}

/// Delegates to the repository's multi-name query (default)
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchLookup;

impl NameLookup for BatchLookup {
    fn find_by_names(
        &self,
        repository: &dyn SettingsRepository,
        names: &[String],
        owner: Option<&OwnerId>,
    ) -> Result<Vec<Setting>> {
        repository.find_by_names(names, owner)
    }
}

/// Fetches the whole scope and filters by name in memory
///
/// For document stores where the owner is an embedded reference and a name `IN`
/// query is unavailable or slower than a scan of one owner's rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerScanLookup;

impl NameLookup for OwnerScanLookup {
    fn find_by_names(
        &self,
        repository: &dyn SettingsRepository,
        names: &[String],
        owner: Option<&OwnerId>,
    ) -> Result<Vec<Setting>> {
        let mut rows = repository.find_by_owner(owner)?;
        rows.retain(|row| names.contains(&row.name));
        Ok(rows)
    }
}
