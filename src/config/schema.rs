//! Setting definitions and the schema trait
//!
//! # Overview
//!
//! Every setting a [`SettingsManager`](crate::SettingsManager) can read or write must be
//! declared up front with a [`SettingDefinition`]:
//!
//! - **Scope**: where the setting lives (`Global`, `User` or `All`)
//! - **Default value**: returned when nothing is stored (optional)
//!
//! ```rust
//! use scoped_settings::{SettingDefinition, Scope};
//! use serde_json::json;
//!
//! let title = SettingDefinition::global().default_value(json!("My Site"));
//! let theme = SettingDefinition::all().default_value(json!("dark"));
//! let signature = SettingDefinition::user();
//!
//! assert_eq!(title.scope, Scope::Global);
//! assert!(signature.default_value.is_none());
//! assert!(theme.allows_owner(true) && theme.allows_owner(false));
//! ```
//!
//! # Scope Rules
//!
//! | Scope    | Without owner | With owner | Fallback                       |
//! |----------|---------------|------------|--------------------------------|
//! | `Global` | ✅            | ❌         | -                              |
//! | `User`   | ❌            | ✅         | -                              |
//! | `All`    | ✅            | ✅         | owner value, then global value |

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

// =============================================================================
// Scope
// =============================================================================

/// Visibility class of a setting
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Only readable and writable without an owner
    Global,
    /// Only readable and writable for an owner
    User,
    /// Valid either way; the global value backs owners that have none
    #[default]
    All,
}

impl Scope {
    /// Whether a setting of this scope may be addressed with (or without) an owner
    #[must_use]
    pub fn allows_owner(self, has_owner: bool) -> bool {
        match self {
            Scope::Global => !has_owner,
            Scope::User => has_owner,
            Scope::All => true,
        }
    }

    /// Serialized name of the scope
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::User => "user",
            Scope::All => "all",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Setting Definition
// =============================================================================

/// Declaration of a single setting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingDefinition {
    /// Where the setting may be stored
    #[serde(default)]
    pub scope: Scope,

    /// Value returned when nothing is stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl SettingDefinition {
    /// Create a definition with the given scope and no default
    #[must_use]
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            default_value: None,
        }
    }

    /// Setting that exists only without an owner
    #[must_use]
    pub fn global() -> Self {
        Self::new(Scope::Global)
    }

    /// Setting that exists only per owner
    #[must_use]
    pub fn user() -> Self {
        Self::new(Scope::User)
    }

    /// Setting with a global value that owners may override
    #[must_use]
    pub fn all() -> Self {
        Self::new(Scope::All)
    }

    /// Set the default value
    ///
    /// Defaults are seeded into every loaded scope, owners included. An `All`
    /// setting with a default therefore reads as that default for an owner without
    /// a value of their own, not as the global value; declare it without a default
    /// to let owners inherit the global value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.default_value = if value.is_null() { None } else { Some(value) };
        self
    }

    /// Shorthand for [`Scope::allows_owner`]
    #[must_use]
    pub fn allows_owner(&self, has_owner: bool) -> bool {
        self.scope.allows_owner(has_owner)
    }

    /// The declared default, or `null` when none was declared
    #[must_use]
    pub fn initial_value(&self) -> Value {
        self.default_value.clone().unwrap_or(Value::Null)
    }
}

// =============================================================================
// Settings Schema Trait
// =============================================================================

/// Trait for types that declare a set of settings
///
/// Implement this on a marker type to register its definitions with
/// [`SettingsConfigBuilder::with_schema`](crate::SettingsConfigBuilder::with_schema).
pub trait SettingsSchema {
    /// All setting definitions, keyed by setting name
    fn definitions() -> HashMap<String, SettingDefinition>;

    /// Names of all declared settings with the given scope, sorted
    #[must_use]
    fn names_with_scope(scope: Scope) -> Vec<String> {
        let mut names: Vec<String> = Self::definitions()
            .into_iter()
            .filter(|(_, def)| def.scope == scope)
            .map(|(name, _)| name)
            .collect();
        names.sort();
        names
    }
}

// Empty schema for managers configured purely at runtime
impl SettingsSchema for () {
    fn definitions() -> HashMap<String, SettingDefinition> {
        HashMap::new()
    }
}

/// Macro for building a definitions `HashMap` more cleanly
///
/// # Example
/// ```rust
/// use scoped_settings::{settings, SettingDefinition, SettingsSchema};
/// use serde_json::json;
/// use std::collections::HashMap;
///
/// struct SiteSettings;
///
/// impl SettingsSchema for SiteSettings {
///     fn definitions() -> HashMap<String, SettingDefinition> {
///         settings! {
///             "site.title" => SettingDefinition::global().default_value(json!("Home")),
///             "ui.theme" => SettingDefinition::all().default_value(json!("dark")),
///             "profile.signature" => SettingDefinition::user(),
///         }
///     }
/// }
///
/// assert_eq!(SiteSettings::definitions().len(), 3);
/// ```
#[macro_export]
macro_rules! settings {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut map = std::collections::HashMap::new();
        $(
            map.insert($key.to_string(), $value);
        )*
        map
    }};
}

// =============================================================================
// Tests
// =============================================================================
