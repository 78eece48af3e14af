//! Raw attribute values as a directory reports them.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// A single attribute value. Directories report either text or raw octets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Binary(Vec<u8>),
}

impl AttributeValue {
    /// Returns the text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            AttributeValue::Binary(_) => None,
        }
    }

    /// Returns the raw bytes of either variant.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            AttributeValue::Text(s) => s.as_bytes(),
            AttributeValue::Binary(b) => b,
        }
    }

    /// Converts into text, decoding binary values that happen to be UTF-8.
    pub fn into_text(self) -> Result<String> {
        match self {
            AttributeValue::Text(s) => Ok(s),
            AttributeValue::Binary(b) => String::from_utf8(b).map_err(|_| Error::NotText),
        }
    }

    /// Converts into raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            AttributeValue::Text(s) => s.into_bytes(),
            AttributeValue::Binary(b) => b,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, AttributeValue::Binary(_))
    }

    /// Compares two values the way most directory string syntaxes do
    /// (case-insensitive for text, byte equality otherwise).
    pub fn matches_ignore_case(&self, other: &AttributeValue) -> bool {
        match (self, other) {
            (AttributeValue::Text(a), AttributeValue::Text(b)) => a.eq_ignore_ascii_case(b),
            _ => self.as_bytes() == other.as_bytes(),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Binary(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<Vec<u8>> for AttributeValue {
    fn from(b: Vec<u8>) -> Self {
        AttributeValue::Binary(b)
    }
}

impl From<&[u8]> for AttributeValue {
    fn from(b: &[u8]) -> Self {
        AttributeValue::Binary(b.to_vec())
    }
}

impl From<Octets> for AttributeValue {
    fn from(o: Octets) -> Self {
        AttributeValue::Binary(o.0)
    }
}

/// An owned binary attribute value (a JPEG photo, a certificate, ...).
///
/// Kept distinct from `Vec<u8>` so a field of raw octets is never confused
/// with a sequence of single-byte values.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Octets(Vec<u8>);

impl Octets {
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Octets {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Octets {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Octets {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}
