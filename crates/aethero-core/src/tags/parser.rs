//! Annotation block parser

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::{Tag, TagPosition, TagValue, TagValueKind};

static BLOCK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^}]+)\}").expect("annotation block pattern is valid"));

/// Problem found while parsing an annotation block.
///
/// A broken number skips its whole block; an empty key drops only its pair.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// A value looked numeric but could not be converted
    #[error("invalid numeric literal '{literal}' for key '{key}' in block at {start}")]
    InvalidNumber {
        key: String,
        literal: String,
        start: usize,
    },
    /// A `key: value` segment had an empty key; the block's other pairs are kept
    #[error("empty key in block at {start}")]
    EmptyKey { start: usize },
}

/// Outcome statistics of the most recent parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseReport {
    pub blocks_found: usize,
    pub blocks_parsed: usize,
    pub warnings: Vec<ParseWarning>,
}

impl ParseReport {
    /// Share of blocks that parsed cleanly; `0.0` when no block was found.
    pub fn success_rate(&self) -> f64 {
        if self.blocks_found == 0 {
            return 0.0;
        }
        self.blocks_parsed as f64 / self.blocks_found as f64
    }
}

/// Extracts tags from `{key: value, ...}` blocks and keeps the latest result
/// for querying.
///
/// ```rust
/// use aethero_core::tags::{TagParser, TagValue};
///
/// let mut parser = TagParser::new();
/// let tags = parser.parse("{mental_state: 'focused', certainty_level: 0.85}");
///
/// assert_eq!(tags.len(), 2);
/// assert_eq!(tags[0].value, TagValue::Text("focused".into()));
/// assert_eq!(tags[1].value, TagValue::Float(0.85));
/// ```
#[derive(Debug, Default, Clone)]
pub struct TagParser {
    tags: Vec<Tag>,
    report: ParseReport,
}

impl TagParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every annotation block in `content`.
    ///
    /// Malformed blocks are skipped with a warning; the remaining blocks are
    /// still parsed. Replaces the previous result.
    pub fn parse(&mut self, content: &str) -> Vec<Tag> {
        let mut tags = Vec::new();
        let mut report = ParseReport::default();

        for captures in BLOCK_PATTERN.captures_iter(content) {
            let (Some(block), Some(inner)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            report.blocks_found += 1;

            let position = TagPosition {
                start: block.start(),
                end: block.end(),
                line: line_of(content, block.start()),
            };

            match parse_block(inner.as_str(), position.start) {
                Ok(block) => {
                    report.blocks_parsed += 1;
                    for warning in block.dropped {
                        warn!(
                            start = position.start,
                            line = position.line,
                            %warning,
                            "Dropping annotation pair"
                        );
                        report.warnings.push(warning);
                    }
                    tags.extend(
                        block
                            .pairs
                            .into_iter()
                            .map(|(name, value)| Tag::new(name, value, position)),
                    );
                }
                Err(warning) => {
                    warn!(
                        start = position.start,
                        line = position.line,
                        %warning,
                        "Skipping malformed annotation block"
                    );
                    report.warnings.push(warning);
                }
            }
        }

        debug!(
            tags = tags.len(),
            blocks = report.blocks_found,
            skipped = report.warnings.len(),
            "Parsed annotation blocks"
        );

        self.tags = tags;
        self.report = report;
        self.tags.clone()
    }

    /// Tags from the most recent parse
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn last_report(&self) -> &ParseReport {
        &self.report
    }

    pub fn tags_by_name(&self, name: &str) -> Vec<&Tag> {
        self.tags.iter().filter(|tag| tag.name == name).collect()
    }

    pub fn tags_by_value_kind(&self, kind: TagValueKind) -> Vec<&Tag> {
        self.tags
            .iter()
            .filter(|tag| tag.value.kind() == kind)
            .collect()
    }

    /// Tags whose block starts within `start..=end`
    pub fn tags_in_range(&self, start: usize, end: usize) -> Vec<&Tag> {
        self.tags
            .iter()
            .filter(|tag| (start..=end).contains(&tag.position.start))
            .collect()
    }
}

/// Check that a serialized tag carries `name`, `value` and a complete `position`.
pub fn validate_tag_structure(tag: &serde_json::Value) -> bool {
    let Some(fields) = tag.as_object() else {
        return false;
    };

    if !["name", "value", "position"]
        .iter()
        .all(|field| fields.contains_key(*field))
    {
        return false;
    }

    fields
        .get("position")
        .and_then(|position| position.as_object())
        .is_some_and(|position| {
            ["start", "end", "line"]
                .iter()
                .all(|field| position.contains_key(*field))
        })
}

fn line_of(content: &str, offset: usize) -> usize {
    content.as_bytes()[..offset]
        .iter()
        .filter(|b| **b == b'\n')
        .count()
        + 1
}

struct ParsedBlock {
    pairs: Vec<(String, TagValue)>,
    dropped: Vec<ParseWarning>,
}

fn parse_block(inner: &str, start: usize) -> Result<ParsedBlock, ParseWarning> {
    let mut pairs: Vec<(String, TagValue)> = Vec::new();
    let mut dropped = Vec::new();

    for segment in inner.trim().split(',') {
        let Some((key, raw)) = segment.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let raw = raw.trim();

        if key.is_empty() {
            dropped.push(ParseWarning::EmptyKey { start });
            continue;
        }

        let value = coerce_value(raw).ok_or_else(|| ParseWarning::InvalidNumber {
            key: key.to_string(),
            literal: raw.to_string(),
            start,
        })?;

        match pairs.iter_mut().find(|(existing, _)| existing == key) {
            Some(pair) => pair.1 = value,
            None => pairs.push((key.to_string(), value)),
        }
    }

    Ok(ParsedBlock { pairs, dropped })
}

/// Coerce a raw value: number, then boolean, then quoted string, then raw text.
///
/// Returns `None` only for numeric-looking literals that fail to convert.
fn coerce_value(raw: &str) -> Option<TagValue> {
    let unsigned = raw.strip_prefix('-').unwrap_or(raw);
    if looks_numeric(unsigned) {
        return if unsigned.contains('.') {
            raw.parse::<f64>().ok().map(TagValue::Float)
        } else {
            raw.parse::<i64>().ok().map(TagValue::Integer)
        };
    }

    if raw.eq_ignore_ascii_case("true") {
        return Some(TagValue::Boolean(true));
    }
    if raw.eq_ignore_ascii_case("false") {
        return Some(TagValue::Boolean(false));
    }

    Some(TagValue::Text(strip_quotes(raw).to_string()))
}

fn looks_numeric(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit()) && s.bytes().all(|b| b.is_ascii_digit() || b == b'.')
}

/// Strip one matching pair of quotes. A lone quote character strips to empty.
fn strip_quotes(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    let (Some(&first), Some(&last)) = (bytes.first(), bytes.last()) else {
        return raw;
    };
    if first != last || (first != b'\'' && first != b'"') {
        return raw;
    }
    if bytes.len() == 1 {
        return "";
    }
    &raw[1..raw.len() - 1]
}
