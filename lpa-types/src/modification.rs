//! Attribute modifications sent to a directory in one modify request.

use crate::attribute::Attribute;
use crate::value::AttributeValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of change applied to one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModificationOp {
    /// Add values; the attribute is created if missing.
    Add,
    /// Replace all values. An empty value list deletes the attribute.
    Replace,
    /// Remove the listed values, or the whole attribute if none are listed.
    Remove,
}

impl fmt::Display for ModificationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModificationOp::Add => "add",
            ModificationOp::Replace => "replace",
            ModificationOp::Remove => "remove",
        })
    }
}

/// One operation on one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modification {
    pub op: ModificationOp,
    pub attribute: Attribute,
}

impl Modification {
    #[must_use]
    pub fn new(op: ModificationOp, attribute: Attribute) -> Self {
        Self { op, attribute }
    }

    pub fn add<V, I>(name: &str, values: I) -> Self
    where
        V: Into<AttributeValue>,
        I: IntoIterator<Item = V>,
    {
        Self::new(ModificationOp::Add, Attribute::with_values(name, values))
    }

    pub fn replace<V, I>(name: &str, values: I) -> Self
    where
        V: Into<AttributeValue>,
        I: IntoIterator<Item = V>,
    {
        Self::new(ModificationOp::Replace, Attribute::with_values(name, values))
    }

    pub fn remove<V, I>(name: &str, values: I) -> Self
    where
        V: Into<AttributeValue>,
        I: IntoIterator<Item = V>,
    {
        Self::new(ModificationOp::Remove, Attribute::with_values(name, values))
    }

    /// Name of the attribute being modified.
    pub fn name(&self) -> &str {
        self.attribute.name()
    }
}
