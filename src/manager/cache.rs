//! Cache state for `SettingsManager`
//!
//! Owned by a single manager instance. Holds the global layer and one layer per
//! owner, each stamped with the time it was loaded.

use crate::cache::CacheStrategy;
use crate::owner::OwnerId;
use serde_json::Value;
use std::collections::HashMap;
use time::OffsetDateTime;

/// One loaded scope: name -> decoded value (`Null` when unset)
pub(crate) struct CachedLayer {
    pub values: HashMap<String, Value>,
    pub loaded_at: OffsetDateTime,
}

#[derive(Default)]
pub(crate) struct SettingsCache {
    global: Option<CachedLayer>,
    owners: HashMap<OwnerId, CachedLayer>,
}

impl SettingsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything; the next access reloads from the repository
    pub fn reset(&mut self) {
        self.global = None;
        self.owners.clear();
    }

    pub fn invalidate_global(&mut self) {
        self.global = None;
    }

    pub fn invalidate_owner(&mut self, owner: &OwnerId) -> bool {
        self.owners.remove(owner).is_some()
    }

    /// Whether the global layer must be (re)loaded
    ///
    /// With `respect_expiry` false only a missing layer counts.
    pub fn global_needs_load(
        &self,
        strategy: CacheStrategy,
        now: OffsetDateTime,
        respect_expiry: bool,
    ) -> bool {
        Self::needs_load(self.global.as_ref(), strategy, now, respect_expiry)
    }

    pub fn owner_needs_load(
        &self,
        owner: &OwnerId,
        strategy: CacheStrategy,
        now: OffsetDateTime,
        respect_expiry: bool,
    ) -> bool {
        Self::needs_load(self.owners.get(owner), strategy, now, respect_expiry)
    }

    fn needs_load(
        layer: Option<&CachedLayer>,
        strategy: CacheStrategy,
        now: OffsetDateTime,
        respect_expiry: bool,
    ) -> bool {
        match layer {
            None => true,
            Some(layer) => respect_expiry && strategy.is_stale(layer.loaded_at, now),
        }
    }

    pub fn replace_global(&mut self, values: HashMap<String, Value>, now: OffsetDateTime) {
        self.global = Some(CachedLayer {
            values,
            loaded_at: now,
        });
    }

    pub fn replace_owner(
        &mut self,
        owner: OwnerId,
        values: HashMap<String, Value>,
        now: OffsetDateTime,
    ) {
        self.owners.insert(
            owner,
            CachedLayer {
                values,
                loaded_at: now,
            },
        );
    }

    pub fn global(&self) -> Option<&HashMap<String, Value>> {
        self.global.as_ref().map(|layer| &layer.values)
    }

    pub fn owner(&self, owner: &OwnerId) -> Option<&HashMap<String, Value>> {
        self.owners.get(owner).map(|layer| &layer.values)
    }

    /// Non-null global value of a setting
    pub fn global_value(&self, name: &str) -> Option<&Value> {
        self.global()
            .and_then(|values| values.get(name))
            .filter(|value| !value.is_null())
    }

    /// Non-null owner value of a setting
    pub fn owner_value(&self, owner: &OwnerId, name: &str) -> Option<&Value> {
        self.owner(owner)
            .and_then(|values| values.get(name))
            .filter(|value| !value.is_null())
    }

    /// Write a value into the loaded layer of its scope
    ///
    /// Returns false when that layer has not been loaded.
    pub fn stage(&mut self, name: &str, value: Value, owner: Option<&OwnerId>) -> bool {
        let layer = match owner {
            None => self.global.as_mut(),
            Some(id) => self.owners.get_mut(id),
        };
        match layer {
            Some(layer) => {
                layer.values.insert(name.to_string(), value);
                true
            }
            None => false,
        }
    }

    pub fn loaded_owner_count(&self) -> usize {
        self.owners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use time::macros::datetime;

    #[test]
    fn test_needs_load() {
        let mut cache = SettingsCache::new();
        let t0 = datetime!(2024-01-01 0:00 UTC);
        let later = datetime!(2024-01-01 1:00 UTC);
        let ttl = CacheStrategy::Ttl(Duration::from_secs(60));

        assert!(cache.global_needs_load(ttl, t0, true));
        cache.replace_global(HashMap::new(), t0);
        assert!(!cache.global_needs_load(ttl, t0, true));
        assert!(cache.global_needs_load(ttl, later, true));
        assert!(!cache.global_needs_load(ttl, later, false));
    }

    #[test]
    fn test_stage_requires_loaded_layer() {
        let mut cache = SettingsCache::new();
        let alice = OwnerId::from("alice");
        let now = datetime!(2024-01-01 0:00 UTC);

        assert!(!cache.stage("a", json!(1), Some(&alice)));

        cache.replace_owner(alice.clone(), HashMap::from([("a".to_string(), Value::Null)]), now);
        assert!(cache.owner_value(&alice, "a").is_none());

        assert!(cache.stage("a", json!(1), Some(&alice)));
        assert_eq!(cache.owner_value(&alice, "a"), Some(&json!(1)));
        assert!(cache.global_value("a").is_none());
    }

    #[test]
    fn test_reset_and_invalidate() {
        let mut cache = SettingsCache::new();
        let alice = OwnerId::from("alice");
        let now = datetime!(2024-01-01 0:00 UTC);

        cache.replace_global(HashMap::new(), now);
        cache.replace_owner(alice.clone(), HashMap::new(), now);
        assert_eq!(cache.loaded_owner_count(), 1);

        assert!(cache.invalidate_owner(&alice));
        assert!(!cache.invalidate_owner(&alice));

        cache.replace_owner(alice, HashMap::new(), now);
        cache.reset();
        assert!(cache.global().is_none());
        assert_eq!(cache.loaded_owner_count(), 0);
    }
}
