//! Common test utilities for scoped-settings integration tests
//!
//! Provides a shared settings schema, an owner type and manager fixtures.

#![allow(dead_code)]

use scoped_settings::{
    CacheStrategy, ManualClock, MemoryRepository, OwnerId, SettingDefinition, SettingsManager,
    SettingsOwner, SettingsSchema, settings,
};
use std::collections::HashMap;
use std::sync::Arc;

// =============================================================================
// Test Settings Schema
// =============================================================================

/// One setting of each scope, with and without defaults
pub struct SiteSettings;

impl SettingsSchema for SiteSettings {
    fn definitions() -> HashMap<String, SettingDefinition> {
        settings! {
            "site.title" => SettingDefinition::global().default_value("My Site"),
            "site.maintenance" => SettingDefinition::global().default_value(false),
            "profile.signature" => SettingDefinition::user(),
            "profile.page_size" => SettingDefinition::user().default_value(20),
            "ui.theme" => SettingDefinition::all(),
            "ui.locale" => SettingDefinition::all().default_value("en"),
        }
    }
}

// =============================================================================
// Owners
// =============================================================================

/// Application user that owns settings
pub struct User {
    pub id: u64,
    pub name: String,
}

impl User {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

impl SettingsOwner for User {
    fn setting_identifier(&self) -> OwnerId {
        OwnerId::from(self.id)
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================

/// Manager over a shared in-memory repository with a controllable clock
pub struct TestFixture {
    pub repository: Arc<MemoryRepository>,
    pub clock: ManualClock,
    pub manager: SettingsManager<Arc<MemoryRepository>>,
}

impl TestFixture {
    /// Create a fixture with default cache strategies
    pub fn new() -> Self {
        Self::with_owner_cache(CacheStrategy::Full)
    }

    /// Create a fixture with a specific owner cache strategy
    pub fn with_owner_cache(strategy: CacheStrategy) -> Self {
        let repository = Arc::new(MemoryRepository::new());
        let clock = ManualClock::default();
        let manager = SettingsManager::builder(Arc::clone(&repository))
            .with_schema::<SiteSettings>()
            .owner_cache(strategy)
            .clock(clock.clone())
            .build()
            .expect("Failed to create manager");

        Self {
            repository,
            clock,
            manager,
        }
    }

    /// A second manager over the same repository, as another request would see it
    pub fn second_manager(&self) -> SettingsManager<Arc<MemoryRepository>> {
        SettingsManager::builder(Arc::clone(&self.repository))
            .with_schema::<SiteSettings>()
            .clock(self.clock.clone())
            .build()
            .expect("Failed to create manager")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a test logger once; repeated calls are harmless
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
