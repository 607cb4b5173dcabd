//! Value serializers
//!
//! Setting values travel through the cache as `serde_json::Value` and are stored as
//! strings. A serializer converts between the two and must round-trip every value a
//! definition can hold, `null` included.

use crate::error::{Error, Result};
use serde_json::Value;
use std::sync::Arc;

/// Trait for converting setting values to and from their stored form
pub trait SettingsSerializer: Send + Sync {
    /// Encode a value for storage
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be encoded.
    fn serialize(&self, value: &Value) -> Result<String>;

    /// Decode a stored value
    ///
    /// # Errors
    ///
    /// Returns an error if the stored string is not valid for this format.
    fn deserialize(&self, stored: &str) -> Result<Value>;

    /// Serializer name for logging/debugging
    fn name(&self) -> &'static str;
}

// =============================================================================
// JSON Serializer
// =============================================================================

/// JSON serializer (default)
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl SettingsSerializer for JsonSerializer {
    fn serialize(&self, value: &Value) -> Result<String> {
        serde_json::to_string(value).map_err(Error::from)
    }

    fn deserialize(&self, stored: &str) -> Result<Value> {
        serde_json::from_str(stored).map_err(|e| Error::Parse(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

/// Look up a serializer by its configured name
///
/// # Errors
///
/// Returns `Error::UnknownSerializer` for names without an implementation.
pub fn serializer_by_name(name: &str) -> Result<Arc<dyn SettingsSerializer>> {
    match name {
        "json" => Ok(Arc::new(JsonSerializer)),
        other => Err(Error::UnknownSerializer(other.to_string())),
    }
}

// =============================================================================
// Tests
// =============================================================================
