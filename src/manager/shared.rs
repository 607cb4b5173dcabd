//! Thread-safe handle around a `SettingsManager`
//!
//! Every call holds the lock for the whole operation, so a batch staged by one
//! caller is flushed before another caller can stage anything.

use crate::error::Result;
use crate::manager::SettingsManager;
use crate::owner::SettingsOwner;
use crate::repository::{MemoryRepository, SettingsRepository};
use crate::sync::MutexExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Cloneable, lock-protected settings manager
pub struct SharedSettingsManager<R: SettingsRepository = MemoryRepository> {
    inner: Arc<Mutex<SettingsManager<R>>>,
}

impl<R: SettingsRepository> Clone for SharedSettingsManager<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: SettingsRepository> From<SettingsManager<R>> for SharedSettingsManager<R> {
    fn from(manager: SettingsManager<R>) -> Self {
        Self::new(manager)
    }
}

impl<R: SettingsRepository> SharedSettingsManager<R> {
    pub fn new(manager: SettingsManager<R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    /// Run several operations under one lock
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns.
    pub fn with<T>(&self, f: impl FnOnce(&mut SettingsManager<R>) -> Result<T>) -> Result<T> {
        let mut manager = self.inner.lock_recovered()?;
        f(&mut *manager)
    }

    /// See [`SettingsManager::get`]
    pub fn get(&self, name: &str, owner: Option<&dyn SettingsOwner>) -> Result<Value> {
        self.with(|m| m.get(name, owner))
    }

    /// See [`SettingsManager::get_or`]
    pub fn get_or(
        &self,
        name: &str,
        owner: Option<&dyn SettingsOwner>,
        default: impl Into<Value>,
    ) -> Result<Value> {
        self.with(|m| m.get_or(name, owner, default))
    }

    /// See [`SettingsManager::all`]
    pub fn all(&self, owner: Option<&dyn SettingsOwner>) -> Result<HashMap<String, Value>> {
        self.with(|m| m.all(owner))
    }

    /// See [`SettingsManager::set`]
    pub fn set(
        &self,
        name: &str,
        value: impl Into<Value>,
        owner: Option<&dyn SettingsOwner>,
    ) -> Result<()> {
        self.with(|m| m.set(name, value, owner).map(|_| ()))
    }

    /// See [`SettingsManager::set_many`]
    pub fn set_many<I, K, V>(&self, settings: I, owner: Option<&dyn SettingsOwner>) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.with(|m| m.set_many(settings, owner).map(|_| ()))
    }

    /// See [`SettingsManager::clear`]
    pub fn clear(&self, name: &str, owner: Option<&dyn SettingsOwner>) -> Result<()> {
        self.with(|m| m.clear(name, owner).map(|_| ()))
    }

    /// See [`SettingsManager::reset`]
    pub fn reset(&self) -> Result<()> {
        self.with(|m| {
            m.reset();
            Ok(())
        })
    }
}
