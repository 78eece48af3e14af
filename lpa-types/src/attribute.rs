//! Named, possibly multi-valued attributes.

use crate::value::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One attribute of an entry: a name and its values in directory order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    name: String,
    values: Vec<AttributeValue>,
}

impl Attribute {
    /// Creates an attribute with no values.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    /// Creates an attribute holding `values`.
    pub fn with_values<V, I>(name: impl Into<String>, values: I) -> Self
    where
        V: Into<AttributeValue>,
        I: IntoIterator<Item = V>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// The attribute name, as first written.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[AttributeValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<AttributeValue> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The first value, if any.
    pub fn first(&self) -> Option<&AttributeValue> {
        self.values.first()
    }

    /// Appends a value.
    pub fn push(&mut self, value: impl Into<AttributeValue>) {
        self.values.push(value.into());
    }

    /// True if an equal value (case-insensitive for text) is present.
    pub fn contains(&self, value: &AttributeValue) -> bool {
        self.values.iter().any(|v| v.matches_ignore_case(value))
    }

    /// Removes every value matching `value`. Returns true if one was removed.
    pub fn remove_value(&mut self, value: &AttributeValue) -> bool {
        let before = self.values.len();
        self.values.retain(|v| !v.matches_ignore_case(value));
        self.values.len() != before
    }

    /// Iterates over the text values, skipping binary ones.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.values.iter().filter_map(AttributeValue::as_text)
    }
}

/// All attributes of an entry, keyed case-insensitively by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet {
    attributes: BTreeMap<String, Attribute>,
}

fn key(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an attribute by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(&key(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.get_mut(&key(name))
    }

    /// Values of an attribute; empty when the attribute is absent.
    pub fn values(&self, name: &str) -> &[AttributeValue] {
        self.get(name).map(Attribute::values).unwrap_or(&[])
    }

    /// First text value of an attribute.
    pub fn first_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|a| a.texts().next())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(&key(name))
    }

    /// Inserts an attribute, replacing any existing one of the same name.
    pub fn put(&mut self, attribute: Attribute) -> Option<Attribute> {
        self.attributes.insert(key(attribute.name()), attribute)
    }

    /// Builder form of [`AttributeSet::put`].
    #[must_use]
    pub fn with<V, I>(mut self, name: &str, values: I) -> Self
    where
        V: Into<AttributeValue>,
        I: IntoIterator<Item = V>,
    {
        self.put(Attribute::with_values(name, values));
        self
    }

    /// Appends a value, creating the attribute if needed.
    pub fn add_value(&mut self, name: &str, value: impl Into<AttributeValue>) {
        self.attributes
            .entry(key(name))
            .or_insert_with(|| Attribute::new(name))
            .push(value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Attribute> {
        self.attributes.remove(&key(name))
    }

    /// Removes a single value; drops the attribute once it has no values left.
    pub fn remove_value(&mut self, name: &str, value: &AttributeValue) -> bool {
        let k = key(name);
        let Some(attr) = self.attributes.get_mut(&k) else {
            return false;
        };
        let removed = attr.remove_value(value);
        if attr.is_empty() {
            self.attributes.remove(&k);
        }
        removed
    }

    /// Attribute names as first written.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.values().map(Attribute::name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Puts every attribute of `other` into this set, replacing same-named ones.
    pub fn merge(&mut self, other: AttributeSet) {
        for attribute in other {
            self.put(attribute);
        }
    }

    /// Copy of this set restricted to `names`.
    #[must_use]
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> AttributeSet {
        names
            .iter()
            .filter_map(|n| self.get(n.as_ref()).cloned())
            .collect()
    }
}

impl FromIterator<Attribute> for AttributeSet {
    fn from_iter<T: IntoIterator<Item = Attribute>>(iter: T) -> Self {
        let mut set = AttributeSet::new();
        for attribute in iter {
            set.put(attribute);
        }
        set
    }
}

impl IntoIterator for AttributeSet {
    type Item = Attribute;
    type IntoIter = std::collections::btree_map::IntoValues<String, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.into_values()
    }
}

impl<'a> IntoIterator for &'a AttributeSet {
    type Item = &'a Attribute;
    type IntoIter = std::collections::btree_map::Values<'a, String, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.values()
    }
}
