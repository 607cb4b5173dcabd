//! Core configuration types and traits
//!
//! This module contains the foundational types for declaring settings:
//! - `SettingsConfig` - Configuration for the settings manager
//! - `SettingsSchema` - Trait for declaring settings in code
//! - `SettingDefinition` - Scope and default value of one setting

mod schema;
mod types;

pub use schema::{Scope, SettingDefinition, SettingsSchema};

pub use types::{SettingsConfig, SettingsConfigBuilder};
