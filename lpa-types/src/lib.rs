//! Core directory entry types for LPA.
//!
//! This crate defines the plain data that flows between a directory service
//! and the mapping engine:
//! - Distinguished names ([`Dn`], [`Rdn`]) with RFC 4514 parsing and escaping
//! - Attribute values, attributes and case-insensitive attribute sets
//! - Entries (a DN plus its attribute set)
//! - Attribute modifications (add / replace / remove)
//!
//! Nothing here talks to a directory; see `lpa-directory` for that.

mod attribute;
mod dn;
mod entry;
mod modification;
mod value;

pub use attribute::{Attribute, AttributeSet};
pub use dn::{escape_value, unescape_value, Ava, Dn, Rdn};
pub use entry::{Entry, OBJECT_CLASS};
pub use modification::{Modification, ModificationOp};
pub use value::{AttributeValue, Octets};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or decoding entry types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid distinguished name {input:?}: {reason}")]
    InvalidDn { input: String, reason: String },

    #[error("invalid escape sequence in {0:?}")]
    InvalidEscape(String),

    #[error("attribute value is not valid UTF-8 text")]
    NotText,
}
