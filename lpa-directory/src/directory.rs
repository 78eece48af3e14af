//! The directory capability consumed by the mapping engine.

use crate::error::DirectoryResult;
use lpa_types::{Dn, Entry, Modification};
use serde::{Deserialize, Serialize};

/// How far below the base DN a search reaches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    /// Only the base entry itself.
    Base,
    /// Immediate children of the base, not the base.
    OneLevel,
    /// The base and everything beneath it.
    #[default]
    Subtree,
}

impl SearchScope {
    /// True if `dn` falls inside this scope relative to `base`.
    pub fn contains(&self, base: &Dn, dn: &Dn) -> bool {
        match self {
            SearchScope::Base => dn == base,
            SearchScope::OneLevel => dn.is_child_of(base),
            SearchScope::Subtree => dn.is_descendant_of(base),
        }
    }
}

/// A search against one directory subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub base: Dn,
    pub scope: SearchScope,
    /// RFC 4515 filter text, e.g. `(&(objectClass=organization)(o=*Hair*))`.
    pub filter: String,
    /// Attributes to return. Empty means all user attributes.
    pub attributes: Vec<String>,
}

impl SearchRequest {
    /// A subtree search returning all attributes.
    #[must_use]
    pub fn new(base: Dn, filter: impl Into<String>) -> Self {
        Self {
            base,
            scope: SearchScope::Subtree,
            filter: filter.into(),
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn scope(mut self, scope: SearchScope) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn attributes<S: Into<String>, I: IntoIterator<Item = S>>(mut self, names: I) -> Self {
        self.attributes = names.into_iter().map(Into::into).collect();
        self
    }
}

/// A connection factory for one directory.
///
/// Implementations must be cheap to share; every directory operation of the
/// mapping engine opens its own session and closes it when done.
pub trait Directory: Send + Sync {
    /// Opens (and authenticates) a new session.
    fn open(&self) -> DirectoryResult<Box<dyn DirectorySession>>;
}

/// A live session with a directory.
pub trait DirectorySession {
    /// Reads one entry. `attributes` empty means all attributes.
    /// Returns `Ok(None)` when the entry does not exist.
    fn lookup(&mut self, dn: &Dn, attributes: &[String]) -> DirectoryResult<Option<Entry>>;

    /// Runs a search, returning entries in directory order.
    fn search(&mut self, request: &SearchRequest) -> DirectoryResult<Vec<Entry>>;

    /// Applies all modifications to one entry atomically.
    fn modify(&mut self, dn: &Dn, modifications: &[Modification]) -> DirectoryResult<()>;

    /// Creates a new entry.
    fn add(&mut self, entry: &Entry) -> DirectoryResult<()>;

    /// Deletes a leaf entry.
    fn delete(&mut self, dn: &Dn) -> DirectoryResult<()>;

    /// Releases the session.
    fn close(self: Box<Self>) -> DirectoryResult<()>;
}
