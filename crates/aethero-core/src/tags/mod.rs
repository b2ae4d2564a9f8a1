//! Tag annotations
//!
//! A tag is one coerced key/value pair extracted from a `{key: value, ...}`
//! block inside free-form text. Tags are produced by [`TagParser`] and are
//! immutable once created.

mod parser;

pub use parser::{ParseReport, ParseWarning, TagParser, validate_tag_structure};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Payload;

/// Byte span of the enclosing annotation block and its 1-based line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPosition {
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

/// Coerced value of a tag.
///
/// Variant order matters for untagged deserialization: booleans and integers
/// must be tried before floats and strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Map(Payload),
}

/// Runtime type of a [`TagValue`], used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagValueKind {
    Boolean,
    Integer,
    Float,
    Text,
    Map,
}

impl TagValue {
    pub fn kind(&self) -> TagValueKind {
        match self {
            TagValue::Boolean(_) => TagValueKind::Boolean,
            TagValue::Integer(_) => TagValueKind::Integer,
            TagValue::Float(_) => TagValueKind::Float,
            TagValue::Text(_) => TagValueKind::Text,
            TagValue::Map(_) => TagValueKind::Map,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TagValue::Integer(i) => Some(*i as f64),
            TagValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TagValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Boolean(b) => write!(f, "{b}"),
            TagValue::Integer(i) => write!(f, "{i}"),
            TagValue::Float(x) => write!(f, "{x}"),
            TagValue::Text(s) => f.write_str(s),
            TagValue::Map(m) => write!(f, "{}", serde_json::Value::Object(m.clone())),
        }
    }
}

impl From<TagValue> for serde_json::Value {
    fn from(value: TagValue) -> Self {
        match value {
            TagValue::Boolean(b) => b.into(),
            TagValue::Integer(i) => i.into(),
            TagValue::Float(f) => f.into(),
            TagValue::Text(s) => s.into(),
            TagValue::Map(m) => serde_json::Value::Object(m),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Text(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Text(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Integer(value)
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        TagValue::Float(value)
    }
}

impl From<bool> for TagValue {
    fn from(value: bool) -> Self {
        TagValue::Boolean(value)
    }
}

/// One annotation extracted from text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: TagValue,
    pub position: TagPosition,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub(crate) fn new(name: String, value: TagValue, position: TagPosition) -> Self {
        Self {
            name,
            value,
            position,
            created_at: Utc::now(),
        }
    }

    /// JSON form used when handing tags to external collaborators
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "value": serde_json::Value::from(self.value.clone()),
            "position": {
                "start": self.position.start,
                "end": self.position.end,
                "line": self.position.line,
            },
            "created_at": self.created_at.to_rfc3339(),
        })
    }
}

/// Build a standalone tag outside of a parse.
///
/// A missing position defaults to an empty span on line 1, which fails
/// `start < end`; callers persisting such tags should supply a real position.
pub fn create_tag(
    name: impl Into<String>,
    value: impl Into<TagValue>,
    position: Option<TagPosition>,
) -> Tag {
    Tag::new(
        name.into(),
        value.into(),
        position.unwrap_or(TagPosition {
            start: 0,
            end: 0,
            line: 1,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_value_roundtrip_keeps_kind() {
        for value in [
            TagValue::Boolean(true),
            TagValue::Integer(3),
            TagValue::Float(0.85),
            TagValue::Text("focused".into()),
        ] {
            let json = serde_json::to_string(&value).unwrap();
            let back: TagValue = serde_json::from_str(&json).unwrap();
            assert_eq!(back.kind(), value.kind(), "{json}");
        }
    }

    #[test]
    fn test_create_tag_defaults_position() {
        let tag = create_tag("emotion_tone", "neutral", None);
        assert_eq!(tag.position.line, 1);
        assert_eq!(tag.value.as_str(), Some("neutral"));
    }

    #[test]
    fn test_to_json_shape_passes_validation() {
        let tag = create_tag(
            "context_id",
            "conv_123",
            Some(TagPosition {
                start: 4,
                end: 30,
                line: 2,
            }),
        );
        assert!(validate_tag_structure(&tag.to_json()));
    }
}
