//! Builder for SettingsManager
//!
//! This module contains [`SettingsManagerBuilder`] which provides a fluent API
//! for creating a [`SettingsManager`](super::SettingsManager).

use crate::cache::CacheStrategy;
use crate::clock::{Clock, SystemClock};
use crate::config::{SettingDefinition, SettingsConfig, SettingsConfigBuilder, SettingsSchema};
use crate::error::Result;
use crate::repository::{BatchLookup, NameLookup, SettingsRepository};
use crate::serializer::{JsonSerializer, SettingsSerializer};
use std::sync::Arc;

use super::SettingsManager;

/// Builder for creating a [`SettingsManager`] with a fluent API.
///
/// # Example
///
/// ```rust
/// use scoped_settings::{JsonFileRepository, SettingDefinition, SettingsManager};
/// use std::time::Duration;
///
/// let dir = tempfile::tempdir().unwrap();
/// let repository = JsonFileRepository::new(dir.path().join("settings.json"));
/// let manager = SettingsManager::builder(repository)
///     .setting("site.title", SettingDefinition::global().default_value("Home"))
///     .setting("ui.theme", SettingDefinition::all().default_value("dark"))
///     .global_ttl(Duration::from_secs(60))
///     .build()
///     .unwrap();
/// ```
pub struct SettingsManagerBuilder<R: SettingsRepository> {
    repository: R,
    config_builder: SettingsConfigBuilder,
    serializer: Arc<dyn SettingsSerializer>,
    lookup: Box<dyn NameLookup>,
    clock: Arc<dyn Clock>,
}

impl<R: SettingsRepository> SettingsManagerBuilder<R> {
    /// Create a new builder around a repository
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            config_builder: SettingsConfigBuilder::new(),
            serializer: Arc::new(JsonSerializer),
            lookup: Box::new(BatchLookup),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the whole configuration.
    ///
    /// Definitions and cache strategies set earlier on this builder are discarded.
    pub fn config(mut self, config: SettingsConfig) -> Self {
        self.config_builder = SettingsConfigBuilder::new()
            .definitions(config.definitions)
            .global_cache(config.global_cache)
            .owner_cache(config.owner_cache);
        self
    }

    /// Declare a single setting.
    pub fn setting(mut self, name: impl Into<String>, definition: SettingDefinition) -> Self {
        self.config_builder = self.config_builder.setting(name, definition);
        self
    }

    /// Declare every setting of a schema type.
    pub fn with_schema<Schema: SettingsSchema>(mut self) -> Self {
        self.config_builder = self.config_builder.with_schema::<Schema>();
        self
    }

    /// Set the global cache strategy (default: 5 minute TTL).
    pub fn global_cache(mut self, strategy: CacheStrategy) -> Self {
        self.config_builder = self.config_builder.global_cache(strategy);
        self
    }

    /// Set the global cache TTL.
    pub fn global_ttl(mut self, ttl: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.global_ttl(ttl);
        self
    }

    /// Set the per-owner cache strategy (default: load once).
    pub fn owner_cache(mut self, strategy: CacheStrategy) -> Self {
        self.config_builder = self.config_builder.owner_cache(strategy);
        self
    }

    /// Use a different value serializer (default: JSON).
    pub fn serializer(mut self, serializer: Arc<dyn SettingsSerializer>) -> Self {
        self.serializer = serializer;
        self
    }

    /// Use a different name lookup strategy for flushes (default: [`BatchLookup`]).
    pub fn lookup(mut self, lookup: impl NameLookup + 'static) -> Self {
        self.lookup = Box::new(lookup);
        self
    }

    /// Use a different time source (default: system clock).
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Build the [`SettingsManager`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a cache strategy is invalid.
    pub fn build(self) -> Result<SettingsManager<R>> {
        SettingsManager::with_parts(
            self.repository,
            self.config_builder.build(),
            self.serializer,
            self.lookup,
            self.clock,
        )
    }
}
