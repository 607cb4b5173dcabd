use crate::config::{Scope, SettingDefinition};
use crate::error::{Error, Result};
use crate::manager::SettingsManager;
use crate::owner::{OwnerId, SettingsOwner};
use crate::repository::{ChangeSet, Setting, SettingsRepository};

use log::debug;
use serde_json::Value;
use std::collections::HashMap;

impl<R: SettingsRepository> SettingsManager<R> {
    // =========================================================================
    // Reading
    // =========================================================================

    /// Get the effective value of a setting, or its declared default.
    ///
    /// Returns `Value::Null` when neither a value nor a default exists.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The setting is not declared (`Error::UnknownSetting`)
    /// - The owner does not match the setting's scope (`Error::WrongScope`)
    /// - Loading from the repository fails
    pub fn get(&mut self, name: &str, owner: Option<&dyn SettingsOwner>) -> Result<Value> {
        self.get_or(name, owner, Value::Null)
    }

    /// Get the effective value of a setting, falling back to `default`.
    ///
    /// Declared defaults are part of the cached values, so `default` only applies
    /// when the effective value is `null`: the setting has no declared default, or
    /// it was cleared earlier through this manager. A `null` `default` defers to the
    /// declared one.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_or(
        &mut self,
        name: &str,
        owner: Option<&dyn SettingsOwner>,
        default: impl Into<Value>,
    ) -> Result<Value> {
        let owner = owner.map(|o| o.setting_identifier());
        self.validate_for(name, owner.is_some())?;
        self.load_scopes(owner.as_ref(), true)?;
        self.resolve(name, owner.as_ref(), default.into())
    }

    /// Get a setting deserialized into `T`.
    ///
    /// Returns `Ok(None)` when the effective value is `null`.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get), plus `Error::Parse` if the value does not fit `T`.
    pub fn get_as<T>(&mut self, name: &str, owner: Option<&dyn SettingsOwner>) -> Result<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        match self.get(name, owner)? {
            Value::Null => Ok(None),
            value => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| Error::Parse(format!("{name}: {e}"))),
        }
    }

    /// Get every setting of a scope.
    ///
    /// Without an owner this is the global scope as cached. With an owner it is that
    /// owner's settings, where each unset value falls back to the global value of the
    /// same name.
    ///
    /// # Errors
    ///
    /// Returns repository and serializer errors unchanged.
    pub fn all(&mut self, owner: Option<&dyn SettingsOwner>) -> Result<HashMap<String, Value>> {
        let owner = owner.map(|o| o.setting_identifier());
        self.load_scopes(owner.as_ref(), true)?;

        let global = self.cache.global().cloned().unwrap_or_default();
        let Some(id) = owner else {
            return Ok(global);
        };

        let mut settings = self.cache.owner(&id).cloned().unwrap_or_default();
        for (name, value) in &mut settings {
            if value.is_null() {
                if let Some(fallback) = global.get(name).filter(|v| !v.is_null()) {
                    *value = fallback.clone();
                }
            }
        }
        Ok(settings)
    }

    /// Resolve a setting from the cache. Expects its scopes to be loaded.
    fn resolve(&self, name: &str, owner: Option<&OwnerId>, default: Value) -> Result<Value> {
        let definition = self.validate_for(name, owner.is_some())?;
        let default = if default.is_null() {
            definition.initial_value()
        } else {
            default
        };

        let value = match definition.scope {
            Scope::Global => self.cache.global_value(name),
            Scope::All => owner
                .and_then(|id| self.cache.owner_value(id, name))
                .or_else(|| self.cache.global_value(name)),
            Scope::User => owner.and_then(|id| self.cache.owner_value(id, name)),
        };

        Ok(value.cloned().unwrap_or(default))
    }

    // =========================================================================
    // Writing
    // =========================================================================

    /// Set a setting and persist it immediately.
    ///
    /// # Errors
    ///
    /// Returns validation errors before anything is changed; repository and
    /// serializer errors from the flush.
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<Value>,
        owner: Option<&dyn SettingsOwner>,
    ) -> Result<&mut Self> {
        let owner = owner.map(|o| o.setting_identifier());
        self.stage(name, value.into(), owner.as_ref(), true)?;
        self.flush_scope(&[name.to_string()], owner.as_ref())
    }

    /// Set several settings of one scope and persist them in a single commit.
    ///
    /// Every entry is staged before anything is written: one query fetches the
    /// existing rows and one commit stores all values.
    ///
    /// # Errors
    ///
    /// Stops at the first entry that fails validation. Entries staged before it stay
    /// in the cache but are not persisted.
    pub fn set_many<I, K, V>(
        &mut self,
        settings: I,
        owner: Option<&dyn SettingsOwner>,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let owner = owner.map(|o| o.setting_identifier());
        let mut names: Vec<String> = Vec::new();
        for (name, value) in settings {
            let name = name.into();
            // Only the first entry may refresh the cache; later ones must not drop staged values.
            self.stage(&name, value.into(), owner.as_ref(), names.is_empty())?;
            if !names.contains(&name) {
                names.push(name);
            }
        }
        self.flush_scope(&names, owner.as_ref())
    }

    /// Clear a setting (set it to `null`) and persist the result.
    ///
    /// Afterwards the setting reads as its default, or as the global value for an
    /// `All` setting cleared for an owner.
    ///
    /// # Errors
    ///
    /// Same as [`set`](Self::set).
    pub fn clear(&mut self, name: &str, owner: Option<&dyn SettingsOwner>) -> Result<&mut Self> {
        self.set(name, Value::Null, owner)
    }

    /// Persist the cached values of `names` for one scope.
    ///
    /// Each name is re-resolved to its effective value (defaults and global
    /// fallbacks included) and written to its existing row, or to a new row bound
    /// to the owner. Names whose scope does not match the owner are skipped.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownSetting` for undeclared names, and repository or
    /// serializer errors unchanged.
    pub fn flush<I, S>(&mut self, names: I, owner: Option<&dyn SettingsOwner>) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let owner = owner.map(|o| o.setting_identifier());
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        self.flush_scope(&unique, owner.as_ref())
    }

    /// Write a value into the cache without persisting it
    fn stage(
        &mut self,
        name: &str,
        value: Value,
        owner: Option<&OwnerId>,
        refresh: bool,
    ) -> Result<()> {
        self.validate_for(name, owner.is_some())?;
        self.load_scopes(owner, refresh)?;
        if !self.cache.stage(name, value, owner) {
            return Err(Error::Config(format!(
                "Cache for '{name}' was not loaded before staging"
            )));
        }
        Ok(())
    }

    fn flush_scope(&mut self, names: &[String], owner: Option<&OwnerId>) -> Result<&mut Self> {
        if names.is_empty() {
            return Ok(self);
        }

        // Staged values live in the cache; only load what is missing, never refresh.
        self.load_scopes(owner, false)?;

        let existing = self
            .lookup
            .find_by_names(&self.repository, names, owner)?;
        let mut existing_by_name: HashMap<String, Setting> = HashMap::new();
        for row in existing {
            existing_by_name.entry(row.name.clone()).or_insert(row);
        }

        let mut changes = ChangeSet::default();
        for name in names {
            let value = match self.resolve(name, owner, Value::Null) {
                Ok(value) => value,
                Err(e) if e.is_scope_error() => {
                    debug!("Skipping flush of '{name}': {e}");
                    continue;
                }
                Err(e) => return Err(e),
            };
            let encoded = self.serializer.serialize(&value)?;

            match existing_by_name.remove(name) {
                Some(mut row) => {
                    row.value = encoded;
                    changes.updates.push(row);
                }
                None => changes
                    .inserts
                    .push(Setting::new(name.clone(), owner.cloned(), encoded)),
            }
        }

        debug!(
            "Flushing {} new and {} updated setting(s) for {}",
            changes.inserts.len(),
            changes.updates.len(),
            owner.map_or_else(|| "global scope".to_string(), |id| format!("owner '{id}'"))
        );
        self.repository.commit(changes)?;
        Ok(self)
    }

    /// Definitions of all settings usable with (or without) an owner
    pub fn definitions_for(
        &self,
        owner: Option<&dyn SettingsOwner>,
    ) -> HashMap<&str, &SettingDefinition> {
        self.config
            .definitions
            .iter()
            .filter(|(_, definition)| definition.allows_owner(owner.is_some()))
            .map(|(name, definition)| (name.as_str(), definition))
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
