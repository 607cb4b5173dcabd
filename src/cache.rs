//! Cache management types

use std::time::Duration;
use time::OffsetDateTime;

/// Default refresh age of the global cache
pub const DEFAULT_GLOBAL_TTL: Duration = Duration::from_secs(5 * 60);

/// Cache strategy for a layer of settings (global or per-owner)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheStrategy {
    /// Load once, keep until explicitly invalidated (default)
    #[default]
    Full,
    /// Reload once the cached data is older than the given duration
    Ttl(Duration),
    /// No caching - always read from the repository
    None,
}

impl CacheStrategy {
    /// Validate cache strategy configuration
    ///
    /// # Errors
    ///
    /// Returns error if the TTL is zero (use `CacheStrategy::None` instead)
    pub fn validate(&self) -> crate::Result<()> {
        match self {
            CacheStrategy::Ttl(ttl) if ttl.is_zero() => Err(crate::Error::Config(
                "Cache TTL must be greater than 0".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Whether data loaded at `loaded_at` must be reloaded at `now`
    ///
    /// Expiry is strict: data exactly `ttl` old is still fresh. A clock that went
    /// backwards never expires anything.
    #[must_use]
    pub fn is_stale(&self, loaded_at: OffsetDateTime, now: OffsetDateTime) -> bool {
        match self {
            CacheStrategy::Full => false,
            CacheStrategy::None => true,
            CacheStrategy::Ttl(ttl) => {
                let age = now - loaded_at;
                !age.is_negative() && age.unsigned_abs() > *ttl
            }
        }
    }
}
