//! Distinguished-name templates for foreign aggregates.
//!
//! A template is a DN with a single `?` placeholder, such as
//! `cn=?,ou=bus-categories,dc=example,dc=com`. Loading substitutes an escaped
//! attribute value for the placeholder; writing goes the other way and
//! recovers the attribute value from the DN of a referenced entry.

use crate::error::{ConfigurationError, MappingResult};
use lpa_types::{escape_value, Dn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The placeholder character in a template.
pub const PLACEHOLDER: char = '?';

/// Stand-in value used to locate the placeholder inside the parsed template.
const MARKER: &str = "\u{1}lpa-placeholder\u{1}";

/// Where a foreign aggregate gets its DN template from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DnReference {
    /// A fixed template.
    Literal(String),
    /// The name of a text accessor on the enclosing entity that returns the template.
    Accessor(String),
}

impl DnReference {
    pub fn literal(template: impl Into<String>) -> Self {
        DnReference::Literal(template.into())
    }

    pub fn accessor(name: impl Into<String>) -> Self {
        DnReference::Accessor(name.into())
    }
}

/// A parsed template with exactly one placeholder.
#[derive(Debug, Clone)]
pub struct DnTemplate {
    source: String,
    prefix: String,
    suffix: String,
    pattern: Dn,
    rdn_index: usize,
    ava_index: usize,
    value_prefix: String,
    value_suffix: String,
}

impl DnTemplate {
    /// Parses a template. Zero or several placeholders, or a template that
    /// cannot form a DN, is a configuration error.
    pub fn parse(template: &str) -> Result<Self, ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidTemplate {
            template: template.to_string(),
            reason,
        };

        let placeholders = template.matches(PLACEHOLDER).count();
        if placeholders != 1 {
            return Err(invalid(format!(
                "expected exactly one '{PLACEHOLDER}' placeholder, found {placeholders}"
            )));
        }
        let (prefix, suffix) = template
            .split_once(PLACEHOLDER)
            .ok_or_else(|| invalid("missing placeholder".to_string()))?;

        let pattern = Dn::parse(&format!("{prefix}{}{suffix}", escape_value(MARKER)))
            .map_err(|e| invalid(e.to_string()))?;

        let mut location = None;
        for (rdn_index, rdn) in pattern.rdns().iter().enumerate() {
            for (ava_index, ava) in rdn.avas().iter().enumerate() {
                if let Some((before, after)) = ava.value().split_once(MARKER) {
                    location = Some((rdn_index, ava_index, before.to_string(), after.to_string()));
                }
            }
        }
        let (rdn_index, ava_index, value_prefix, value_suffix) = location
            .ok_or_else(|| invalid("placeholder must stand in an attribute value".to_string()))?;

        Ok(Self {
            source: template.to_string(),
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            pattern,
            rdn_index,
            ava_index,
            value_prefix,
            value_suffix,
        })
    }

    /// The template text as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Replaces the placeholder with the escaped `raw` value.
    pub fn substitute(&self, raw: &str) -> MappingResult<Dn> {
        let text = format!("{}{}{}", self.prefix, escape_value(raw), self.suffix);
        Ok(Dn::parse(&text)?)
    }

    /// Recovers the placeholder value from a DN built by this template.
    /// Returns `None` when `dn` does not have the template's shape.
    pub fn extract(&self, dn: &Dn) -> Option<String> {
        if dn.len() != self.pattern.len() {
            return None;
        }
        for (index, (have, want)) in dn.rdns().iter().zip(self.pattern.rdns()).enumerate() {
            if index != self.rdn_index {
                if have != want {
                    return None;
                }
                continue;
            }
            if have.avas().len() != want.avas().len() {
                return None;
            }
            for (ava_index, (h, w)) in have.avas().iter().zip(want.avas()).enumerate() {
                if !h.attr_type().eq_ignore_ascii_case(w.attr_type()) {
                    return None;
                }
                if ava_index != self.ava_index && h.value().to_lowercase() != w.value().to_lowercase() {
                    return None;
                }
            }
        }

        let value = dn.rdns()[self.rdn_index].avas()[self.ava_index].value();
        let inner = value
            .strip_prefix(self.value_prefix.as_str())?
            .strip_suffix(self.value_suffix.as_str())?;
        Some(inner.to_string())
    }
}

impl fmt::Display for DnTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
