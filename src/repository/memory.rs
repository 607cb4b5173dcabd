//! In-memory repository for testing and ephemeral settings

use super::{ChangeSet, Setting, SettingsRepository};
use crate::error::{Error, Result};
use crate::owner::OwnerId;
use crate::sync::RwLockExt;
use std::collections::HashSet;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory setting rows (not persisted)
///
/// Counts every query and every commit, which makes cache hits and batching
/// observable.
pub struct MemoryRepository {
    rows: RwLock<Vec<Setting>>,
    queries: AtomicUsize,
    commits: AtomicUsize,
}

impl MemoryRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    /// Create a repository pre-populated with rows
    #[must_use]
    pub fn with_rows(rows: Vec<Setting>) -> Self {
        Self {
            rows: RwLock::new(rows),
            queries: AtomicUsize::new(0),
            commits: AtomicUsize::new(0),
        }
    }

    /// Number of find queries served so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Number of successful commits so far
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Snapshot of all rows
    pub fn rows(&self) -> Vec<Setting> {
        self.rows
            .read_recovered()
            .map(|rows| rows.clone())
            .unwrap_or_default()
    }

    /// Find a single row
    pub fn row(&self, name: &str, owner: Option<&OwnerId>) -> Option<Setting> {
        self.rows()
            .into_iter()
            .find(|row| row.name == name && row.is_owned_by(owner))
    }

    fn select(&self, filter: impl Fn(&Setting) -> bool) -> Result<Vec<Setting>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.read_recovered()?;
        Ok(rows.iter().filter(|row| filter(row)).cloned().collect())
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsRepository for MemoryRepository {
    fn find_by_owner(&self, owner: Option<&OwnerId>) -> Result<Vec<Setting>> {
        self.select(|row| row.is_owned_by(owner))
    }

    fn find_by_names(&self, names: &[String], owner: Option<&OwnerId>) -> Result<Vec<Setting>> {
        self.select(|row| row.is_owned_by(owner) && names.contains(&row.name))
    }

    fn commit(&self, changes: ChangeSet) -> Result<()> {
        let mut rows = self.rows.write_recovered()?;
        apply_changes(&mut rows, changes)?;
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Apply a change set to a row list, leaving it untouched on error
pub(crate) fn apply_changes(rows: &mut Vec<Setting>, changes: ChangeSet) -> Result<()> {
    let mut seen = HashSet::new();
    for insert in &changes.inserts {
        let key = (insert.name.as_str(), insert.owner.as_ref());
        if position(rows.as_slice(), insert).is_some() || !seen.insert(key) {
            return Err(Error::Repository(format!(
                "Setting '{}' already exists for {}",
                insert.name,
                describe_owner(insert.owner.as_ref())
            )));
        }
    }
    let mut targets = Vec::with_capacity(changes.updates.len());
    for update in &changes.updates {
        let index = position(rows.as_slice(), update).ok_or_else(|| {
            Error::Repository(format!(
                "Setting '{}' does not exist for {}",
                update.name,
                describe_owner(update.owner.as_ref())
            ))
        })?;
        targets.push(index);
    }

    for (index, update) in targets.into_iter().zip(changes.updates) {
        rows[index].value = update.value;
    }
    rows.extend(changes.inserts);
    Ok(())
}

fn position(rows: &[Setting], target: &Setting) -> Option<usize> {
    rows.iter()
        .position(|row| row.name == target.name && row.owner == target.owner)
}

fn describe_owner(owner: Option<&OwnerId>) -> String {
    owner.map_or_else(|| "global scope".to_string(), |id| format!("owner '{id}'"))
}

// =============================================================================
// Tests
// =============================================================================
