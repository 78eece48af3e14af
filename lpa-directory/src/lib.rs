//! Directory access for LPA.
//!
//! The mapping engine never talks to a server directly. It goes through the
//! [`Directory`] capability defined here:
//! - [`Directory`] opens a [`DirectorySession`] (lookup, search, modify, add, delete, close)
//! - [`SearchRequest`] / [`SearchScope`] describe a search
//! - [`Filter`] parses and evaluates RFC 4515 search filters locally
//! - [`InMemoryDirectory`] is a complete in-process directory for fixtures and tests
//! - [`parse_ldif`] / [`write_ldif`] read and write LDIF content records
//! - [`DirectoryConfig`] holds connection settings, loadable from TOML
//!
//! With the `ldap` feature, [`LdapDirectory`] connects to a real LDAP server.

mod config;
mod directory;
mod error;
mod filter;
#[cfg(feature = "ldap")]
mod ldap;
mod ldif;
mod memory;

pub use config::DirectoryConfig;
pub use directory::{Directory, DirectorySession, SearchRequest, SearchScope};
pub use error::{DirectoryError, DirectoryResult};
pub use filter::{escape_filter_value, Filter};
#[cfg(feature = "ldap")]
pub use ldap::LdapDirectory;
pub use ldif::{parse_ldif, write_ldif};
pub use memory::{InMemoryDirectory, RecordedModify};
