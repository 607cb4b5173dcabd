//! Core configuration types for scoped-settings

use std::collections::HashMap;

use crate::cache::{CacheStrategy, DEFAULT_GLOBAL_TTL};
use crate::config::schema::{SettingDefinition, SettingsSchema};
use crate::error::{Error, Result};

/// Configuration for initializing the `SettingsManager`
///
/// Read-only once the manager is built.
#[derive(Debug, Clone)]
pub struct SettingsConfig {
    /// Declared settings, keyed by name
    pub definitions: HashMap<String, SettingDefinition>,

    /// Refresh policy of the global cache (default: 5 minute TTL)
    pub global_cache: CacheStrategy,

    /// Refresh policy of each owner's cache (default: load once per manager)
    pub owner_cache: CacheStrategy,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            definitions: HashMap::new(),
            global_cache: CacheStrategy::Ttl(DEFAULT_GLOBAL_TTL),
            owner_cache: CacheStrategy::Full,
        }
    }
}

impl SettingsConfig {
    /// Create a new builder for `SettingsConfig`
    ///
    /// # Example
    /// ```rust
    /// use scoped_settings::{SettingsConfig, SettingDefinition};
    ///
    /// let config = SettingsConfig::builder()
    ///     .setting("ui.theme", SettingDefinition::all().default_value("dark"))
    ///     .build();
    /// assert!(config.definition("ui.theme").is_some());
    /// ```
    pub fn builder() -> SettingsConfigBuilder {
        SettingsConfigBuilder::new()
    }

    /// Look up the definition of a setting
    pub fn definition(&self, name: &str) -> Option<&SettingDefinition> {
        self.definitions.get(name)
    }

    /// Check the cache strategies
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if either strategy is invalid.
    pub fn validate(&self) -> Result<()> {
        self.global_cache.validate()?;
        self.owner_cache.validate()
    }

    /// Parse definitions from a JSON document
    ///
    /// The document maps setting names to `{ "scope": ..., "default_value": ... }`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` if the document is malformed.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let definitions: HashMap<String, SettingDefinition> =
            serde_json::from_str(content).map_err(|e| Error::Parse(e.to_string()))?;
        Ok(Self::builder().definitions(definitions).build())
    }

    /// Parse definitions from a TOML document
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` if the document is malformed.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let definitions: HashMap<String, SettingDefinition> =
            toml::from_str(content).map_err(|e| Error::Parse(e.to_string()))?;
        Ok(Self::builder().definitions(definitions).build())
    }

    /// Parse definitions from a YAML document
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` if the document is malformed.
    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let definitions: HashMap<String, SettingDefinition> =
            serde_yaml::from_str(content).map_err(|e| Error::Parse(e.to_string()))?;
        Ok(Self::builder().definitions(definitions).build())
    }
}

/// Builder for creating `SettingsConfig` with a fluent API
#[derive(Debug, Clone)]
pub struct SettingsConfigBuilder {
    definitions: HashMap<String, SettingDefinition>,
    global_cache: CacheStrategy,
    owner_cache: CacheStrategy,
}

impl Default for SettingsConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsConfigBuilder {
    /// Create a new builder with default cache strategies
    pub fn new() -> Self {
        let defaults = SettingsConfig::default();
        Self {
            definitions: defaults.definitions,
            global_cache: defaults.global_cache,
            owner_cache: defaults.owner_cache,
        }
    }

    /// Declare a single setting (replaces an earlier declaration of the same name)
    pub fn setting(mut self, name: impl Into<String>, definition: SettingDefinition) -> Self {
        self.definitions.insert(name.into(), definition);
        self
    }

    /// Declare many settings at once
    pub fn definitions(
        mut self,
        definitions: impl IntoIterator<Item = (String, SettingDefinition)>,
    ) -> Self {
        self.definitions.extend(definitions);
        self
    }

    /// Declare every setting of a schema type
    pub fn with_schema<Schema: SettingsSchema>(self) -> Self {
        self.definitions(Schema::definitions())
    }

    /// Set the global cache strategy
    pub fn global_cache(mut self, strategy: CacheStrategy) -> Self {
        self.global_cache = strategy;
        self
    }

    /// Set the global cache TTL (shorthand for `CacheStrategy::Ttl`)
    pub fn global_ttl(self, ttl: std::time::Duration) -> Self {
        self.global_cache(CacheStrategy::Ttl(ttl))
    }

    /// Set the per-owner cache strategy
    ///
    /// By default an owner's settings are loaded once and never refreshed for the
    /// lifetime of the manager.
    pub fn owner_cache(mut self, strategy: CacheStrategy) -> Self {
        self.owner_cache = strategy;
        self
    }

    /// Build the `SettingsConfig`
    pub fn build(self) -> SettingsConfig {
        SettingsConfig {
            definitions: self.definitions,
            global_cache: self.global_cache,
            owner_cache: self.owner_cache,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Scope;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_builder_defaults() {
        let config = SettingsConfig::builder().build();

        assert!(config.definitions.is_empty());
        assert_eq!(config.global_cache, CacheStrategy::Ttl(DEFAULT_GLOBAL_TTL));
        assert_eq!(config.owner_cache, CacheStrategy::Full);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_with_options() {
        let config = SettingsConfig::builder()
            .setting("a", SettingDefinition::global())
            .setting("a", SettingDefinition::user())
            .global_ttl(Duration::from_secs(30))
            .owner_cache(CacheStrategy::Ttl(Duration::ZERO))
            .build();

        assert_eq!(config.definition("a").map(|d| d.scope), Some(Scope::User));
        assert_eq!(
            config.global_cache,
            CacheStrategy::Ttl(Duration::from_secs(30))
        );
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_from_json_str() {
        let config = SettingsConfig::from_json_str(
            r#"{
                "site.title": { "scope": "global", "default_value": "Home" },
                "ui.theme": { "scope": "all", "default_value": "dark" },
                "profile.signature": { "scope": "user" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.definitions.len(), 3);
        assert_eq!(
            config.definition("site.title"),
            Some(&SettingDefinition::global().default_value(json!("Home")))
        );
        assert_eq!(
            config.definition("profile.signature").map(|d| d.scope),
            Some(Scope::User)
        );
    }

    #[test]
    fn test_from_json_str_rejects_garbage() {
        let result = SettingsConfig::from_json_str(r#"{"x": {"scope": 5}}"#);
        assert!(matches!(result, Err(Error::Parse(_))));
    }
}
