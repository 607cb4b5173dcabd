//! Error types for scoped-settings

use crate::config::Scope;
use thiserror::Error;

/// Result type alias for scoped-settings operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for scoped-settings
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Unknown setting '{0}'")]
    UnknownSetting(String),

    #[error("Setting '{name}' has scope '{scope}' and cannot be used {}", scope_usage(.scope))]
    WrongScope { scope: Scope, name: String },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to parse value: {0}")]
    Parse(String),

    #[error("Unknown serializer '{0}'")]
    UnknownSerializer(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Repository Errors
    // -------------------------------------------------------------------------
    #[error("Repository error: {0}")]
    Repository(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

fn scope_usage(scope: &Scope) -> &'static str {
    match scope {
        Scope::Global => "with an owner",
        Scope::User => "without an owner",
        Scope::All => "here",
    }
}

impl Error {
    /// Check if this is a scope mismatch
    #[must_use]
    pub fn is_scope_error(&self) -> bool {
        matches!(self, Error::WrongScope { .. })
    }

    /// Check if this names an undeclared setting
    #[must_use]
    pub fn is_unknown_setting(&self) -> bool {
        matches!(self, Error::UnknownSetting(_))
    }

    /// Check if this is a serializer failure
    #[must_use]
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            Error::Serialize(_) | Error::Parse(_) | Error::UnknownSerializer(_)
        )
    }
}
