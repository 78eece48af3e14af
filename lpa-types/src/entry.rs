//! A directory entry: a distinguished name plus its attributes.

use crate::attribute::{Attribute, AttributeSet};
use crate::dn::Dn;
use crate::value::AttributeValue;
use serde::{Deserialize, Serialize};

/// Name of the attribute listing the type tags an entry satisfies.
pub const OBJECT_CLASS: &str = "objectClass";

/// A directory entry as read from, or written to, a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub dn: Dn,
    pub attributes: AttributeSet,
}

impl Entry {
    /// Creates an entry with no attributes.
    #[must_use]
    pub fn new(dn: Dn) -> Self {
        Self {
            dn,
            attributes: AttributeSet::new(),
        }
    }

    #[must_use]
    pub fn with_attributes(dn: Dn, attributes: AttributeSet) -> Self {
        Self { dn, attributes }
    }

    /// Builder-style attribute insertion, replacing any previous values.
    #[must_use]
    pub fn with<V, I>(mut self, name: &str, values: I) -> Self
    where
        V: Into<AttributeValue>,
        I: IntoIterator<Item = V>,
    {
        self.attributes.put(Attribute::with_values(name, values));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn values(&self, name: &str) -> &[AttributeValue] {
        self.attributes.values(name)
    }

    /// The object classes of this entry, read from [`OBJECT_CLASS`].
    pub fn object_classes(&self) -> impl Iterator<Item = &str> {
        self.object_classes_in(OBJECT_CLASS)
    }

    /// Object classes read from a differently named type-tag attribute.
    pub fn object_classes_in<'a>(&'a self, attribute: &str) -> impl Iterator<Item = &'a str> {
        self.attributes
            .get(attribute)
            .into_iter()
            .flat_map(Attribute::texts)
    }

    /// True if every class in `required` is listed, ignoring case.
    pub fn has_object_classes<S: AsRef<str>>(&self, attribute: &str, required: &[S]) -> bool {
        required.iter().all(|wanted| {
            self.object_classes_in(attribute)
                .any(|have| have.eq_ignore_ascii_case(wanted.as_ref()))
        })
    }
}
