//! Search filters (RFC 4515 subset) for directories that evaluate locally.
//!
//! Supported: `&`, `|`, `!`, equality, presence (`attr=*`), substrings
//! (`attr=ab*cd*`), `>=`, `<=` and `~=` (treated as whitespace-insensitive
//! equality). Values may use `\XX` hex escapes. The outer parentheses are
//! optional, so `o=*Hair*` and `(o=*Hair*)` are the same filter.

use crate::error::{DirectoryError, DirectoryResult};
use lpa_types::{AttributeValue, Entry};
use std::cmp::Ordering;
use std::fmt;

/// A parsed search filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Equal { attr: String, value: String },
    Approx { attr: String, value: String },
    Present { attr: String },
    Substring {
        attr: String,
        initial: Option<String>,
        any: Vec<String>,
        last: Option<String>,
    },
    GreaterOrEqual { attr: String, value: String },
    LessOrEqual { attr: String, value: String },
}

/// Escapes a raw value for use inside a filter.
pub fn escape_filter_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '*' => out.push_str("\\2a"),
            '(' => out.push_str("\\28"),
            ')' => out.push_str("\\29"),
            '\\' => out.push_str("\\5c"),
            '\0' => out.push_str("\\00"),
            c => out.push(c),
        }
    }
    out
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> DirectoryError {
        DirectoryError::filter(self.source, reason)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(' ') {
            self.pos += 1;
        }
    }

    fn expect(&mut self, wanted: char) -> DirectoryResult<()> {
        match self.peek() {
            Some(c) if c == wanted => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{wanted}' at {}, found '{c}'", self.pos))),
            None => Err(self.error(format!("expected '{wanted}', found end of input"))),
        }
    }

    fn parse_top(&mut self) -> DirectoryResult<Filter> {
        self.skip_spaces();
        let filter = if self.peek() == Some('(') {
            self.parse_filter()?
        } else {
            self.parse_component(true)?
        };
        self.skip_spaces();
        if self.pos != self.chars.len() {
            return Err(self.error(format!("trailing input at {}", self.pos)));
        }
        Ok(filter)
    }

    fn parse_filter(&mut self) -> DirectoryResult<Filter> {
        self.expect('(')?;
        let filter = self.parse_component(false)?;
        self.expect(')')?;
        Ok(filter)
    }

    fn parse_component(&mut self, top_level: bool) -> DirectoryResult<Filter> {
        match self.peek() {
            Some('&') => {
                self.pos += 1;
                Ok(Filter::And(self.parse_list()?))
            }
            Some('|') => {
                self.pos += 1;
                Ok(Filter::Or(self.parse_list()?))
            }
            Some('!') => {
                self.pos += 1;
                self.skip_spaces();
                Ok(Filter::Not(Box::new(self.parse_filter()?)))
            }
            Some(_) => self.parse_item(top_level),
            None => Err(self.error("empty filter")),
        }
    }

    fn parse_list(&mut self) -> DirectoryResult<Vec<Filter>> {
        let mut filters = Vec::new();
        self.skip_spaces();
        while self.peek() == Some('(') {
            filters.push(self.parse_filter()?);
            self.skip_spaces();
        }
        if filters.is_empty() {
            return Err(self.error("'&' and '|' need at least one operand"));
        }
        Ok(filters)
    }

    fn parse_item(&mut self, top_level: bool) -> DirectoryResult<Filter> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == ')' && !top_level {
                break;
            }
            if c == '(' {
                return Err(self.error(format!("unescaped '(' at {}", self.pos)));
            }
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        self.parse_assertion(&text)
    }

    fn parse_assertion(&self, text: &str) -> DirectoryResult<Filter> {
        let eq = text
            .find('=')
            .ok_or_else(|| self.error(format!("{text:?} has no '='")))?;
        let (mut attr, raw) = (&text[..eq], &text[eq + 1..]);

        let kind = match attr.chars().last() {
            Some(c @ ('>' | '<' | '~')) => {
                attr = &attr[..attr.len() - 1];
                Some(c)
            }
            _ => None,
        };
        let attr = attr.trim();
        if attr.is_empty()
            || !attr
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == ';')
        {
            return Err(self.error(format!("invalid attribute description {attr:?}")));
        }
        let attr = attr.to_string();

        match kind {
            Some('>') => Ok(Filter::GreaterOrEqual {
                attr,
                value: self.unescape(raw)?,
            }),
            Some('<') => Ok(Filter::LessOrEqual {
                attr,
                value: self.unescape(raw)?,
            }),
            Some(_) => Ok(Filter::Approx {
                attr,
                value: self.unescape(raw)?,
            }),
            None if raw == "*" => Ok(Filter::Present { attr }),
            None if raw.contains('*') => {
                let pieces: Vec<&str> = raw.split('*').collect();
                let last_index = pieces.len() - 1;
                let mut initial = None;
                let mut any = Vec::new();
                let mut last = None;
                for (i, piece) in pieces.iter().enumerate() {
                    if piece.is_empty() {
                        continue;
                    }
                    let value = self.unescape(piece)?;
                    if i == 0 {
                        initial = Some(value);
                    } else if i == last_index {
                        last = Some(value);
                    } else {
                        any.push(value);
                    }
                }
                Ok(Filter::Substring {
                    attr,
                    initial,
                    any,
                    last,
                })
            }
            None => Ok(Filter::Equal {
                attr,
                value: self.unescape(raw)?,
            }),
        }
    }

    fn unescape(&self, raw: &str) -> DirectoryResult<String> {
        let mut bytes = Vec::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                let hi = chars.next().and_then(|c| c.to_digit(16));
                let lo = chars.next().and_then(|c| c.to_digit(16));
                match (hi, lo) {
                    (Some(hi), Some(lo)) => bytes.push((hi * 16 + lo) as u8),
                    _ => return Err(self.error(format!("bad escape in {raw:?}"))),
                }
            } else {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
        String::from_utf8(bytes).map_err(|_| self.error(format!("{raw:?} is not UTF-8")))
    }
}

fn fold(s: &str) -> String {
    s.to_lowercase()
}

fn compare_values(have: &str, want: &str) -> Ordering {
    match (have.trim().parse::<i64>(), want.trim().parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => fold(have).cmp(&fold(want)),
    }
}

impl Filter {
    /// Parses filter text.
    pub fn parse(text: &str) -> DirectoryResult<Filter> {
        Parser::new(text).parse_top()
    }

    /// `(attr=value)` with `value` taken literally.
    pub fn equal(attr: impl Into<String>, value: impl Into<String>) -> Filter {
        Filter::Equal {
            attr: attr.into(),
            value: value.into(),
        }
    }

    /// Evaluates this filter against an entry.
    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            Filter::And(filters) => filters.iter().all(|f| f.matches(entry)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(entry)),
            Filter::Not(inner) => !inner.matches(entry),
            Filter::Present { attr } => !entry.values(attr).is_empty(),
            Filter::Equal { attr, value } => entry.values(attr).iter().any(|v| match v {
                AttributeValue::Text(t) => fold(t) == fold(value),
                AttributeValue::Binary(b) => b.as_slice() == value.as_bytes(),
            }),
            Filter::Approx { attr, value } => {
                let squash = |s: &str| fold(s).split_whitespace().collect::<String>();
                let wanted = squash(value);
                entry
                    .values(attr)
                    .iter()
                    .filter_map(AttributeValue::as_text)
                    .any(|t| squash(t) == wanted)
            }
            Filter::Substring {
                attr,
                initial,
                any,
                last,
            } => entry
                .values(attr)
                .iter()
                .filter_map(AttributeValue::as_text)
                .any(|t| substring_match(&fold(t), initial, any, last)),
            Filter::GreaterOrEqual { attr, value } => entry
                .values(attr)
                .iter()
                .filter_map(AttributeValue::as_text)
                .any(|t| compare_values(t, value) != Ordering::Less),
            Filter::LessOrEqual { attr, value } => entry
                .values(attr)
                .iter()
                .filter_map(AttributeValue::as_text)
                .any(|t| compare_values(t, value) != Ordering::Greater),
        }
    }
}

fn substring_match(
    text: &str,
    initial: &Option<String>,
    any: &[String],
    last: &Option<String>,
) -> bool {
    let mut rest = text;
    if let Some(initial) = initial {
        let initial = fold(initial);
        match rest.strip_prefix(initial.as_str()) {
            Some(r) => rest = r,
            None => return false,
        }
    }
    for piece in any {
        let piece = fold(piece);
        match rest.find(piece.as_str()) {
            Some(idx) => rest = &rest[idx + piece.len()..],
            None => return false,
        }
    }
    match last {
        Some(last) => rest.ends_with(fold(last).as_str()),
        None => true,
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::And(filters) | Filter::Or(filters) => {
                f.write_str(if matches!(self, Filter::And(_)) { "(&" } else { "(|" })?;
                for filter in filters {
                    write!(f, "{filter}")?;
                }
                f.write_str(")")
            }
            Filter::Not(inner) => write!(f, "(!{inner})"),
            Filter::Equal { attr, value } => write!(f, "({attr}={})", escape_filter_value(value)),
            Filter::Approx { attr, value } => write!(f, "({attr}~={})", escape_filter_value(value)),
            Filter::Present { attr } => write!(f, "({attr}=*)"),
            Filter::Substring {
                attr,
                initial,
                any,
                last,
            } => {
                write!(f, "({attr}=")?;
                if let Some(initial) = initial {
                    f.write_str(&escape_filter_value(initial))?;
                }
                f.write_str("*")?;
                for piece in any {
                    write!(f, "{}*", escape_filter_value(piece))?;
                }
                if let Some(last) = last {
                    f.write_str(&escape_filter_value(last))?;
                }
                f.write_str(")")
            }
            Filter::GreaterOrEqual { attr, value } => {
                write!(f, "({attr}>={})", escape_filter_value(value))
            }
            Filter::LessOrEqual { attr, value } => {
                write!(f, "({attr}<={})", escape_filter_value(value))
            }
        }
    }
}
