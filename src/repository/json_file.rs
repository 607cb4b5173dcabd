//! Repository persisting all rows in one JSON document

use super::memory::apply_changes;
use super::{ChangeSet, Setting, SettingsRepository};
use crate::error::Result;
use crate::owner::OwnerId;
use crate::storage::{JsonStorage, StorageBackend};
use crate::sync::MutexExt;
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File-backed repository
///
/// Every query reads the document; every commit rewrites it once through an
/// atomic temp-file rename. The manager's cache keeps reads infrequent.
///
/// Commits are read-modify-write cycles serialized by a lock held in this
/// instance only. Use one instance per path, shared through an `Arc` when several
/// managers write to the same file; separate instances on one path can overwrite
/// each other's commits.
pub struct JsonFileRepository<S: StorageBackend = JsonStorage> {
    path: PathBuf,
    storage: S,
    /// Serializes read-modify-write cycles of concurrent commits
    write_lock: Mutex<()>,
}

impl JsonFileRepository<JsonStorage> {
    /// Create a repository backed by a pretty-printed JSON file
    ///
    /// Supports `~` expansion for the home directory. The file is created on the
    /// first commit.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_storage(path, JsonStorage::new())
    }
}

impl<S: StorageBackend> JsonFileRepository<S> {
    pub fn with_storage(path: impl Into<PathBuf>, storage: S) -> Self {
        Self {
            path: expand_home(path.into()),
            storage,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<Setting>> {
        Ok(self
            .storage
            .read_optional::<Vec<Setting>>(&self.path)?
            .unwrap_or_default())
    }
}

impl<S: StorageBackend> SettingsRepository for JsonFileRepository<S> {
    fn find_by_owner(&self, owner: Option<&OwnerId>) -> Result<Vec<Setting>> {
        let mut rows = self.load()?;
        rows.retain(|row| row.is_owned_by(owner));
        Ok(rows)
    }

    fn find_by_names(&self, names: &[String], owner: Option<&OwnerId>) -> Result<Vec<Setting>> {
        let mut rows = self.load()?;
        rows.retain(|row| row.is_owned_by(owner) && names.contains(&row.name));
        Ok(rows)
    }

    fn commit(&self, changes: ChangeSet) -> Result<()> {
        let _guard = self.write_lock.lock_recovered()?;
        let mut rows = self.load()?;
        let count = changes.len();
        apply_changes(&mut rows, changes)?;
        self.storage.write_atomic(&self.path, &rows)?;
        debug!("Committed {count} setting(s) to {}", self.path.display());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "json-file"
    }
}

fn expand_home(path: PathBuf) -> PathBuf {
    if !path.starts_with("~") {
        return path;
    }
    match dirs::home_dir() {
        Some(home) => home.join(path.strip_prefix("~").unwrap_or(&path)),
        None => path,
    }
}

// =============================================================================
// Tests
// =============================================================================
