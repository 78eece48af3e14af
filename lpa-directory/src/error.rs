//! Error types for directory access.

use thiserror::Error;

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors reported by a directory or while talking to one.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The named entry does not exist.
    #[error("no such entry: {0}")]
    NoSuchEntry(String),

    /// An entry with this name already exists.
    #[error("entry already exists: {0}")]
    EntryExists(String),

    /// Could not reach or authenticate to the directory.
    #[error("connection error: {0}")]
    Connection(String),

    /// The directory rejected an operation.
    #[error("directory returned code {code}: {message}")]
    Protocol { code: u32, message: String },

    /// A search filter could not be parsed.
    #[error("invalid search filter {filter:?}: {reason}")]
    InvalidFilter { filter: String, reason: String },

    /// A distinguished name could not be parsed.
    #[error("invalid distinguished name: {0}")]
    InvalidDn(#[from] lpa_types::Error),

    /// Invalid connection settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    /// Malformed LDIF input.
    #[error("LDIF error at line {line}: {reason}")]
    Ldif { line: usize, reason: String },

    /// The directory handle is no longer usable.
    #[error("directory closed")]
    Closed,
}

impl DirectoryError {
    pub(crate) fn filter(filter: &str, reason: impl Into<String>) -> Self {
        DirectoryError::InvalidFilter {
            filter: filter.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the error means "the entry is not there", as opposed to a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DirectoryError::NoSuchEntry(_) | DirectoryError::Protocol { code: 32, .. }
        )
    }
}
