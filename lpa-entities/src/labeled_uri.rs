use lpa_mapping::{AttributeElement, FieldShape};
use lpa_types::AttributeValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A `labeledURI` value: a URI, optionally followed by a space and a label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabeledUri {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabeledUriError {
    #[error("labeledURI value is empty")]
    Empty,
}

impl LabeledUri {
    pub fn new(uri: impl Into<String>, label: Option<String>) -> Self {
        Self {
            uri: uri.into(),
            label,
        }
    }

    /// The label, or `fallback` when the value has none.
    pub fn label_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.label.as_deref().unwrap_or(fallback)
    }
}

impl FromStr for LabeledUri {
    type Err = LabeledUriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(LabeledUriError::Empty);
        }
        Ok(match s.split_once(' ') {
            Some((uri, label)) => {
                let label = label.trim();
                Self::new(uri, (!label.is_empty()).then(|| label.to_string()))
            }
            None => Self::new(s, None),
        })
    }
}

impl fmt::Display for LabeledUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} {}", self.uri, label),
            None => f.write_str(&self.uri),
        }
    }
}

impl AttributeElement for LabeledUri {
    const SCALAR: FieldShape = FieldShape::Text;

    fn from_value(value: AttributeValue) -> Result<Self, String> {
        let text = value
            .into_text()
            .map_err(|_| "binary value is not valid UTF-8 text".to_string())?;
        text.parse().map_err(|err: LabeledUriError| err.to_string())
    }

    fn to_value(&self) -> AttributeValue {
        AttributeValue::Text(self.to_string())
    }
}
