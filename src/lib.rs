//! # scoped-settings
//!
//! Settings persistence with global and per-owner (e.g. per-user) values, a
//! short-lived in-memory cache and batched writes.
//!
//! ## Features
//!
//! - **Scopes**: declare each setting `Global`, `User` or `All`; misuse fails fast
//!   with `Error::WrongScope`, undeclared names with `Error::UnknownSetting`
//! - **Fallbacks**: `All` settings read the owner's value first, then the global one,
//!   then the declared default
//! - **Caching**: the global scope refreshes every 5 minutes by default, each owner
//!   loads once; both policies are configurable
//! - **Batched writes**: `set_many` costs one lookup query and one commit, however
//!   many settings it stores
//! - **Pluggable collaborators**: repository, value serializer, name lookup strategy
//!   and clock are all traits
//!
//! ## Quick Start
//!
//! ```rust
//! use scoped_settings::{MemoryRepository, OwnerId, SettingDefinition, SettingsManager};
//! use serde_json::json;
//!
//! let mut manager = SettingsManager::builder(MemoryRepository::new())
//!     .setting("site.title", SettingDefinition::global().default_value("Home"))
//!     .setting("ui.theme", SettingDefinition::all().default_value("dark"))
//!     .setting("profile.signature", SettingDefinition::user())
//!     .build()?;
//!
//! let alice = OwnerId::from("alice");
//! manager.set_many(
//!     [("ui.theme", json!("light")), ("profile.signature", json!("-- A"))],
//!     Some(&alice),
//! )?;
//!
//! assert_eq!(manager.get("ui.theme", Some(&alice))?, json!("light"));
//! assert_eq!(manager.get("ui.theme", None)?, json!("dark"));
//! assert!(manager.get("profile.signature", None).unwrap_err().is_scope_error());
//! # Ok::<(), scoped_settings::Error>(())
//! ```
//!
//! ## Declaring Settings
//!
//! ```rust
//! use scoped_settings::{settings, SettingDefinition, SettingsConfig, SettingsSchema};
//! use std::collections::HashMap;
//!
//! struct AppSettings;
//!
//! impl SettingsSchema for AppSettings {
//!     fn definitions() -> HashMap<String, SettingDefinition> {
//!         settings! {
//!             "site.title" => SettingDefinition::global().default_value("Home"),
//!             "ui.theme" => SettingDefinition::all().default_value("dark"),
//!         }
//!     }
//! }
//!
//! let from_code = SettingsConfig::builder().with_schema::<AppSettings>().build();
//! let from_json = SettingsConfig::from_json_str(
//!     r#"{ "site.title": { "scope": "global", "default_value": "Home" } }"#,
//! )?;
//! assert_eq!(from_code.definition("site.title"), from_json.definition("site.title"));
//! # Ok::<(), scoped_settings::Error>(())
//! ```
//!
//! ## Concurrency
//!
//! A [`SettingsManager`] is meant for one request or session and takes `&mut self`.
//! Share one between threads through [`SharedSettingsManager`], which holds a lock
//! for the duration of each operation.

// Core modules
mod cache;
mod clock;
mod error;
mod manager;
mod owner;
pub mod repository;
pub mod serializer;
pub mod storage;
mod sync;

// Grouped modules
pub mod config;

// Re-exports from core
pub use cache::{CacheStrategy, DEFAULT_GLOBAL_TTL};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use manager::{SettingsManager, SettingsManagerBuilder, SharedSettingsManager};
pub use owner::{OwnerId, SettingsOwner};
pub use repository::{
    BatchLookup, ChangeSet, JsonFileRepository, MemoryRepository, NameLookup, OwnerScanLookup,
    Setting, SettingsRepository,
};
pub use serializer::{JsonSerializer, SettingsSerializer, serializer_by_name};
pub use storage::{JsonStorage, StorageBackend};

// Re-exports from config
pub use config::{Scope, SettingDefinition, SettingsConfig, SettingsConfigBuilder, SettingsSchema};
