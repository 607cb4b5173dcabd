//! Main settings manager module
//!
//! This module contains the [`SettingsManager`] struct which is the primary entry point
//! for reading and writing scoped settings.

mod builder;
mod cache;
mod operations;
mod shared;

pub use builder::SettingsManagerBuilder;
pub use shared::SharedSettingsManager;

use crate::clock::{Clock, SystemClock};
use crate::config::{SettingDefinition, SettingsConfig};
use crate::error::{Error, Result};
use crate::owner::{OwnerId, SettingsOwner};
use crate::repository::{BatchLookup, MemoryRepository, NameLookup, SettingsRepository};
use crate::serializer::{JsonSerializer, SettingsSerializer};

use self::cache::SettingsCache;
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Settings manager for global and per-owner settings.
///
/// The `SettingsManager` keeps an in-memory cache in front of a [`SettingsRepository`]:
///
/// - **Scopes**: every setting is declared `Global`, `User` or `All`
/// - **Lazy loading**: the global scope loads on first access and refreshes after
///   its TTL (5 minutes by default); each owner loads the first time it is used
/// - **Batched writes**: `set_many` stages every value and commits them in one go
///
/// One manager is meant to serve one request or session. It takes `&mut self` and
/// does no locking of its own; wrap it in a [`SharedSettingsManager`] to share it
/// between threads.
///
/// # Example
///
/// ```rust
/// use scoped_settings::{
///     MemoryRepository, OwnerId, SettingDefinition, SettingsConfig, SettingsManager,
/// };
/// use serde_json::json;
///
/// let config = SettingsConfig::builder()
///     .setting("site.title", SettingDefinition::global().default_value("Home"))
///     .setting("ui.theme", SettingDefinition::all().default_value("dark"))
///     .build();
/// let mut manager = SettingsManager::new(MemoryRepository::new(), config)?;
///
/// let alice = OwnerId::from("alice");
/// manager.set("ui.theme", "light", Some(&alice))?;
///
/// assert_eq!(manager.get("ui.theme", Some(&alice))?, json!("light"));
/// assert_eq!(manager.get("ui.theme", None)?, json!("dark"));
/// assert_eq!(manager.get("site.title", None)?, json!("Home"));
/// # Ok::<(), scoped_settings::Error>(())
/// ```
pub struct SettingsManager<R: SettingsRepository = MemoryRepository> {
    /// Declared settings and cache strategies
    config: SettingsConfig,

    /// Backing store
    repository: R,

    /// Encodes values for storage
    serializer: Arc<dyn SettingsSerializer>,

    /// Query strategy used by flushes
    lookup: Box<dyn NameLookup>,

    /// Time source for cache expiry
    clock: Arc<dyn Clock>,

    /// Global and per-owner values
    cache: SettingsCache,
}

impl<R: SettingsRepository> fmt::Debug for SettingsManager<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsManager")
            .field("config", &self.config)
            .field("repository", &self.repository.backend_name())
            .field("serializer", &self.serializer.name())
            .field("cached_owners", &self.cache.loaded_owner_count())
            .finish_non_exhaustive()
    }
}

impl<R: SettingsRepository> SettingsManager<R> {
    /// Create a manager with the JSON serializer, batch lookups and the system clock
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a cache strategy in `config` is invalid.
    pub fn new(repository: R, config: SettingsConfig) -> Result<Self> {
        Self::with_parts(
            repository,
            config,
            Arc::new(JsonSerializer),
            Box::new(BatchLookup),
            Arc::new(SystemClock),
        )
    }

    /// Create a builder for `SettingsManager` with a fluent API.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scoped_settings::{CacheStrategy, MemoryRepository, OwnerScanLookup, SettingsManager};
    ///
    /// let manager = SettingsManager::builder(MemoryRepository::new())
    ///     .lookup(OwnerScanLookup)
    ///     .owner_cache(CacheStrategy::None)
    ///     .build()?;
    /// # Ok::<(), scoped_settings::Error>(())
    /// ```
    pub fn builder(repository: R) -> SettingsManagerBuilder<R> {
        SettingsManagerBuilder::new(repository)
    }

    pub(crate) fn with_parts(
        repository: R,
        config: SettingsConfig,
        serializer: Arc<dyn SettingsSerializer>,
        lookup: Box<dyn NameLookup>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        info!(
            "Initialized SettingsManager with {} setting(s) on '{}' storage ({} values)",
            config.definitions.len(),
            repository.backend_name(),
            serializer.name()
        );

        Ok(Self {
            config,
            repository,
            serializer,
            lookup,
            clock,
            cache: SettingsCache::new(),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &SettingsConfig {
        &self.config
    }

    /// Get the repository
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Consume the manager and return its repository
    pub fn into_repository(self) -> R {
        self.repository
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check that `name` is declared and may be used with (or without) `owner`.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownSetting` if the name is not declared
    /// - `Error::WrongScope` for a `Global` setting with an owner, or a `User`
    ///   setting without one
    pub fn validate_setting(
        &self,
        name: &str,
        owner: Option<&dyn SettingsOwner>,
    ) -> Result<&SettingDefinition> {
        self.validate_for(name, owner.is_some())
    }

    pub(crate) fn validate_for(&self, name: &str, has_owner: bool) -> Result<&SettingDefinition> {
        let definition = self
            .config
            .definition(name)
            .ok_or_else(|| Error::UnknownSetting(name.to_string()))?;

        if !definition.allows_owner(has_owner) {
            return Err(Error::WrongScope {
                scope: definition.scope,
                name: name.to_string(),
            });
        }
        Ok(definition)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Make sure the global scope, and the owner's scope when given, are cached.
    ///
    /// The global scope is reloaded when missing or expired under the global cache
    /// strategy. The owner's scope is loaded when missing, and with the default
    /// `CacheStrategy::Full` is never refreshed afterwards, even when the global
    /// scope is: call [`invalidate_owner`](Self::invalidate_owner) or configure
    /// an owner TTL if per-owner data can change behind the manager's back.
    ///
    /// # Errors
    ///
    /// Returns repository and serializer errors unchanged.
    pub fn load_settings(&mut self, owner: Option<&dyn SettingsOwner>) -> Result<()> {
        let owner = owner.map(|o| o.setting_identifier());
        self.load_scopes(owner.as_ref(), true)
    }

    pub(crate) fn load_scopes(
        &mut self,
        owner: Option<&OwnerId>,
        respect_expiry: bool,
    ) -> Result<()> {
        let now = self.clock.now();

        if self
            .cache
            .global_needs_load(self.config.global_cache, now, respect_expiry)
        {
            let values = self.fetch_scope(None)?;
            debug!("Loaded {} global setting(s)", values.len());
            self.cache.replace_global(values, now);
        }

        if let Some(id) = owner {
            if self
                .cache
                .owner_needs_load(id, self.config.owner_cache, now, respect_expiry)
            {
                let values = self.fetch_scope(Some(id))?;
                debug!("Loaded {} setting(s) for owner '{id}'", values.len());
                self.cache.replace_owner(id.clone(), values, now);
            }
        }

        Ok(())
    }

    /// Build a fresh map for one scope: declared defaults overlaid with stored values.
    fn fetch_scope(&self, owner: Option<&OwnerId>) -> Result<HashMap<String, Value>> {
        let mut values: HashMap<String, Value> = self
            .config
            .definitions
            .iter()
            .filter(|(_, definition)| definition.allows_owner(owner.is_some()))
            .map(|(name, definition)| (name.clone(), definition.initial_value()))
            .collect();

        for row in self.repository.find_by_owner(owner)? {
            match values.get_mut(&row.name) {
                Some(slot) => *slot = self.serializer.deserialize(&row.value)?,
                None if self.config.definition(&row.name).is_none() => {
                    warn!("Ignoring stored value of undeclared setting '{}'", row.name);
                }
                None => {}
            }
        }

        Ok(values)
    }

    // =========================================================================
    // Cache Lifecycle
    // =========================================================================

    /// Drop all cached values; the next access reloads from the repository.
    pub fn reset(&mut self) {
        debug!("Settings cache reset");
        self.cache.reset();
    }

    /// Force the global scope to reload on next access
    pub fn invalidate_global(&mut self) {
        self.cache.invalidate_global();
    }

    /// Force one owner's scope to reload on next access.
    ///
    /// Returns whether that owner was cached.
    pub fn invalidate_owner(&mut self, owner: &dyn SettingsOwner) -> bool {
        self.cache.invalidate_owner(&owner.setting_identifier())
    }

    /// Number of owners currently held in the cache
    pub fn cached_owner_count(&self) -> usize {
        self.cache.loaded_owner_count()
    }
}
