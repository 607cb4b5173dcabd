//! Document storage backend trait and implementations
//!
//! Used by file-backed repositories to read and atomically replace a single
//! serialized document.

use crate::error::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Encoding of a whole document on disk
///
/// Implementors only provide the format; reading and replacing files is shared.
pub trait StorageBackend: Clone + Send + Sync {
    /// Encode a document
    fn serialize<T: Serialize>(&self, data: &T) -> Result<String>;

    /// Decode a document; malformed input is `Error::Parse`
    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T>;

    /// Read and decode a document, `None` if the file does not exist yet
    fn read_optional<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        match fs::read_to_string(path) {
            Ok(content) => self.deserialize(&content).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::FileRead {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    /// Encode and replace the document.
    ///
    /// Readers see either the old or the new document, never a partial one.
    fn write_atomic<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let content = self.serialize(data)?;
        ensure_parent(path)?;

        let staging = staging_path(path)?;
        fs::write(&staging, content).map_err(|e| Error::FileWrite {
            path: staging.display().to_string(),
            source: e,
        })?;
        fs::rename(&staging, path).map_err(|e| Error::FileWrite {
            path: path.display().to_string(),
            source: e,
        })
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| Error::DirectoryCreate {
                path: parent.display().to_string(),
                source: e,
            })
        }
        _ => Ok(()),
    }
}

/// `<dir>/<file>.tmp`, next to the target so the rename stays on one filesystem
fn staging_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| {
            Error::Config(format!("Settings path '{}' has no file name", path.display()))
        })?;
    let mut staging = file_name.to_os_string();
    staging.push(".tmp");
    Ok(path.with_file_name(staging))
}

// =============================================================================
// JSON Storage Implementation
// =============================================================================

/// JSON documents (default)
#[derive(Debug, Clone, Copy)]
pub struct JsonStorage {
    pretty: bool,
}

impl JsonStorage {
    /// Indented output, easy to inspect by hand
    #[must_use]
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Single-line output
    #[must_use]
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for JsonStorage {
    fn serialize<T: Serialize>(&self, data: &T) -> Result<String> {
        let encoded = if self.pretty {
            serde_json::to_string_pretty(data)
        } else {
            serde_json::to_string(data)
        };
        encoded.map_err(Error::from)
    }

    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        serde_json::from_str(content).map_err(|e| Error::Parse(e.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================
