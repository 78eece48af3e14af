//! LDIF content records (RFC 2849), enough for fixtures and dumps.
//!
//! Records are separated by blank lines. Each starts with `dn:`; the rest are
//! `attr: value` or `attr:: base64` lines. A line starting with a single space
//! continues the previous one. `#` lines are comments, and a leading
//! `version: 1` is accepted. Change records and `:<` URL values are rejected.

use crate::error::{DirectoryError, DirectoryResult};
use base64::{engine::general_purpose::STANDARD, Engine};
use lpa_types::{AttributeValue, Dn, Entry};

/// A logical line after unfolding, with the physical line it started on.
struct Line {
    number: usize,
    text: String,
}

fn unfold(input: &str) -> Vec<Option<Line>> {
    // `None` marks a record separator.
    let mut lines: Vec<Option<Line>> = Vec::new();
    for (idx, raw) in input.lines().enumerate() {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if let Some(rest) = raw.strip_prefix(' ') {
            if let Some(Some(prev)) = lines.last_mut() {
                prev.text.push_str(rest);
                continue;
            }
        }
        if raw.trim().is_empty() {
            if !matches!(lines.last(), Some(None) | None) {
                lines.push(None);
            }
            continue;
        }
        if raw.starts_with('#') {
            continue;
        }
        lines.push(Some(Line {
            number: idx + 1,
            text: raw.to_string(),
        }));
    }
    lines
}

fn split_line(line: &Line) -> DirectoryResult<(&str, AttributeValue)> {
    let err = |reason: String| DirectoryError::Ldif {
        line: line.number,
        reason,
    };
    let colon = line
        .text
        .find(':')
        .ok_or_else(|| err(format!("missing ':' in {:?}", line.text)))?;
    let name = line.text[..colon].trim();
    if name.is_empty() {
        return Err(err("empty attribute name".to_string()));
    }
    let rest = &line.text[colon + 1..];

    let value = if let Some(encoded) = rest.strip_prefix(':') {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| err(format!("bad base64 for {name}: {e}")))?;
        match String::from_utf8(bytes) {
            Ok(text) => AttributeValue::Text(text),
            Err(e) => AttributeValue::Binary(e.into_bytes()),
        }
    } else if rest.starts_with('<') {
        return Err(err(format!("URL values are not supported ({name})")));
    } else {
        AttributeValue::Text(rest.trim_start_matches(' ').to_string())
    };
    Ok((name, value))
}

/// Parses LDIF content records into entries, in file order.
pub fn parse_ldif(input: &str) -> DirectoryResult<Vec<Entry>> {
    let mut entries = Vec::new();
    let mut current: Option<Entry> = None;
    let mut first_record = true;

    for line in unfold(input) {
        let Some(line) = line else {
            if let Some(entry) = current.take() {
                entries.push(entry);
            }
            continue;
        };
        let (name, value) = split_line(&line)?;

        match current.as_mut() {
            None => {
                if first_record && name.eq_ignore_ascii_case("version") {
                    first_record = false;
                    continue;
                }
                if !name.eq_ignore_ascii_case("dn") {
                    return Err(DirectoryError::Ldif {
                        line: line.number,
                        reason: format!("record must start with dn:, found {name:?}"),
                    });
                }
                let text = value.into_text().map_err(|_| DirectoryError::Ldif {
                    line: line.number,
                    reason: "dn is not UTF-8".to_string(),
                })?;
                current = Some(Entry::new(Dn::parse(&text)?));
                first_record = false;
            }
            Some(_) if name.eq_ignore_ascii_case("changetype") => {
                return Err(DirectoryError::Ldif {
                    line: line.number,
                    reason: "change records are not supported".to_string(),
                });
            }
            Some(entry) => entry.attributes.add_value(name, value),
        }
    }
    if let Some(entry) = current {
        entries.push(entry);
    }
    Ok(entries)
}

fn is_safe(value: &str) -> bool {
    value
        .chars()
        .next()
        .is_none_or(|c| c != ' ' && c != ':' && c != '<')
        && !value.ends_with(' ')
        && value.chars().all(|c| c.is_ascii() && c != '\0' && c != '\n' && c != '\r')
}

/// Renders entries as LDIF content records.
pub fn write_ldif<'a, I: IntoIterator<Item = &'a Entry>>(entries: I) -> String {
    let mut out = String::new();
    for (i, entry) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        push_line(&mut out, "dn", &AttributeValue::Text(entry.dn.to_string()));
        for attribute in &entry.attributes {
            for value in attribute.values() {
                push_line(&mut out, attribute.name(), value);
            }
        }
    }
    out
}

fn push_line(out: &mut String, name: &str, value: &AttributeValue) {
    match value {
        AttributeValue::Text(text) if is_safe(text) => {
            out.push_str(&format!("{name}: {text}\n"));
        }
        other => {
            out.push_str(&format!("{name}:: {}\n", STANDARD.encode(other.as_bytes())));
        }
    }
}
