//! Distinguished names.
//!
//! A [`Dn`] is an ordered sequence of relative distinguished names, leftmost
//! (most specific) first, exactly as it is written: `cn=Hair Salons,ou=bus-categories,dc=example,dc=com`.
//! Parsing and printing follow RFC 4514. Equality, ordering and hashing use a
//! normalised form: attribute types and values compared case-insensitively,
//! and multi-valued RDN components compared without regard to order.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Characters that always need a backslash inside an attribute value.
const SPECIALS: &[char] = &[',', '+', '"', '\\', '<', '>', ';', '='];

/// Escapes a raw attribute value so it can be embedded in a DN component.
///
/// `escape_value("Doe, John")` is `Doe\, John`. Leading `#`, leading or
/// trailing spaces and NUL are escaped as well.
pub fn escape_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    let last = raw.chars().count().saturating_sub(1);

    for (i, ch) in raw.chars().enumerate() {
        match ch {
            c if SPECIALS.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            '\0' => out.push_str("\\00"),
            ' ' if i == 0 || i == last => out.push_str("\\ "),
            '#' if i == 0 => out.push_str("\\#"),
            c => out.push(c),
        }
    }
    out
}

/// Reverses [`escape_value`]; accepts both `\c` and `\XX` (hex byte) forms.
pub fn unescape_value(escaped: &str) -> Result<String> {
    let mut bytes = Vec::with_capacity(escaped.len());
    let mut chars = escaped.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            continue;
        }

        let first = chars
            .next()
            .ok_or_else(|| Error::InvalidEscape(escaped.to_string()))?;
        if let (Some(hi), Some(lo)) = (
            first.to_digit(16),
            chars.peek().and_then(|c| c.to_digit(16)),
        ) {
            chars.next();
            bytes.push((hi * 16 + lo) as u8);
        } else if SPECIALS.contains(&first) || first == ' ' || first == '#' {
            bytes.push(first as u8);
        } else {
            return Err(Error::InvalidEscape(escaped.to_string()));
        }
    }

    String::from_utf8(bytes).map_err(|_| Error::InvalidEscape(escaped.to_string()))
}

/// Splits on separator characters that are not preceded by an escape.
fn split_unescaped<'a>(input: &'a str, separators: &[char]) -> Result<Vec<&'a str>> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (idx, ch) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if separators.contains(&ch) {
            parts.push(&input[start..idx]);
            start = idx + ch.len_utf8();
        }
    }
    if escaped {
        return Err(Error::InvalidEscape(input.to_string()));
    }
    parts.push(&input[start..]);
    Ok(parts)
}

/// Trims unescaped spaces from both ends of a raw (still escaped) value.
fn trim_value(raw: &str) -> &str {
    let leading = raw.trim_start_matches(' ');
    let trimmed = leading.trim_end_matches(' ');
    if trimmed.len() == leading.len() {
        return trimmed;
    }
    // An odd run of trailing backslashes means the last one escapes a space.
    let backslashes = trimmed.chars().rev().take_while(|c| *c == '\\').count();
    if backslashes % 2 == 1 {
        &leading[..trimmed.len() + 1]
    } else {
        trimmed
    }
}

/// One `type=value` assertion inside an RDN.
#[derive(Debug, Clone)]
pub struct Ava {
    attr_type: String,
    value: String,
}

impl Ava {
    /// Creates an assertion from an attribute type and a raw (unescaped) value.
    pub fn new(attr_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attr_type: attr_type.into(),
            value: value.into(),
        }
    }

    /// Returns the attribute type as written.
    pub fn attr_type(&self) -> &str {
        &self.attr_type
    }

    /// Returns the unescaped value.
    pub fn value(&self) -> &str {
        &self.value
    }

    fn normalized(&self) -> String {
        format!(
            "{}={}",
            self.attr_type.to_ascii_lowercase(),
            escape_value(&self.value.to_lowercase())
        )
    }

    fn parse(dn: &str, text: &str) -> Result<Self> {
        let (attr_type, raw_value) = text.split_once('=').ok_or_else(|| Error::InvalidDn {
            input: dn.to_string(),
            reason: format!("component {text:?} has no '='"),
        })?;
        let attr_type = attr_type.trim_matches(' ');
        if attr_type.is_empty()
            || !attr_type
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        {
            return Err(Error::InvalidDn {
                input: dn.to_string(),
                reason: format!("invalid attribute type {attr_type:?}"),
            });
        }
        Ok(Self {
            attr_type: attr_type.to_string(),
            value: unescape_value(trim_value(raw_value))?,
        })
    }
}

impl fmt::Display for Ava {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attr_type, escape_value(&self.value))
    }
}

/// A relative distinguished name: one or more assertions joined by `+`.
#[derive(Debug, Clone)]
pub struct Rdn {
    avas: Vec<Ava>,
}

impl Rdn {
    /// Creates a single-valued RDN such as `cn=Hair Salons`.
    pub fn new(attr_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            avas: vec![Ava::new(attr_type, value)],
        }
    }

    /// Creates a multi-valued RDN. Returns `None` when `avas` is empty.
    pub fn from_avas(avas: Vec<Ava>) -> Option<Self> {
        if avas.is_empty() {
            None
        } else {
            Some(Self { avas })
        }
    }

    /// All assertions in this RDN.
    pub fn avas(&self) -> &[Ava] {
        &self.avas
    }

    /// Attribute type of the first assertion.
    pub fn attr_type(&self) -> &str {
        self.avas[0].attr_type()
    }

    /// Unescaped value of the first assertion.
    pub fn value(&self) -> &str {
        self.avas[0].value()
    }

    fn normalized(&self) -> String {
        let mut parts: Vec<String> = self.avas.iter().map(Ava::normalized).collect();
        parts.sort();
        parts.join("+")
    }
}

impl fmt::Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ava) in self.avas.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "{ava}")?;
        }
        Ok(())
    }
}

impl PartialEq for Rdn {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for Rdn {}

/// A distinguished name, leftmost RDN first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dn {
    rdns: Vec<Rdn>,
}

impl Dn {
    /// The empty DN (root of the directory tree).
    #[must_use]
    pub const fn root() -> Self {
        Self { rdns: Vec::new() }
    }

    /// Parses an RFC 4514 string.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = trim_value(input);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let mut rdns = Vec::new();
        for rdn_text in split_unescaped(trimmed, &[',', ';'])? {
            let mut avas = Vec::new();
            for ava_text in split_unescaped(rdn_text, &['+'])? {
                avas.push(Ava::parse(input, ava_text)?);
            }
            rdns.push(Rdn { avas });
        }
        Ok(Self { rdns })
    }

    /// Builds a DN from RDNs, leftmost first.
    pub fn from_rdns(rdns: Vec<Rdn>) -> Self {
        Self { rdns }
    }

    /// Returns true for the empty DN.
    pub fn is_root(&self) -> bool {
        self.rdns.is_empty()
    }

    /// Number of RDN components.
    pub fn len(&self) -> usize {
        self.rdns.len()
    }

    /// Alias of [`Dn::is_root`], for collection-like call sites.
    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    /// All RDNs, leftmost first.
    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    /// The leftmost RDN.
    pub fn rdn(&self) -> Option<&Rdn> {
        self.rdns.first()
    }

    /// The DN with the leftmost RDN removed. `None` for the root.
    pub fn parent(&self) -> Option<Dn> {
        if self.rdns.is_empty() {
            None
        } else {
            Some(Self {
                rdns: self.rdns[1..].to_vec(),
            })
        }
    }

    /// Returns a new DN with `rdn` prepended beneath this one.
    #[must_use]
    pub fn child(&self, rdn: Rdn) -> Dn {
        let mut rdns = Vec::with_capacity(self.rdns.len() + 1);
        rdns.push(rdn);
        rdns.extend(self.rdns.iter().cloned());
        Self { rdns }
    }

    /// True if this DN equals `base` or lies anywhere beneath it.
    pub fn is_descendant_of(&self, base: &Dn) -> bool {
        if base.rdns.len() > self.rdns.len() {
            return false;
        }
        let offset = self.rdns.len() - base.rdns.len();
        self.rdns[offset..]
            .iter()
            .zip(&base.rdns)
            .all(|(a, b)| a == b)
    }

    /// True if this DN lies exactly one level beneath `base`.
    pub fn is_child_of(&self, base: &Dn) -> bool {
        self.rdns.len() == base.rdns.len() + 1 && self.is_descendant_of(base)
    }

    /// Case-folded canonical form used for equality, ordering and hashing.
    pub fn normalized(&self) -> String {
        self.rdns
            .iter()
            .map(Rdn::normalized)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rdn) in self.rdns.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{rdn}")?;
        }
        Ok(())
    }
}

impl FromStr for Dn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Dn {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Dn {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<Dn> for String {
    fn from(dn: Dn) -> Self {
        dn.to_string()
    }
}

impl PartialEq for Dn {
    fn eq(&self, other: &Self) -> bool {
        self.rdns.len() == other.rdns.len() && self.normalized() == other.normalized()
    }
}

impl Eq for Dn {}

impl Hash for Dn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl PartialOrd for Dn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dn {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized().cmp(&other.normalized())
    }
}
