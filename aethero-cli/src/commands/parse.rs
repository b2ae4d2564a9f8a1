//! `aethero parse`: extract tags from text

use aethero::TagParser;
use serde_json::{Value, json};
use std::path::Path;

use crate::error::{CliError, read_file};

pub fn run_parse(text: Option<String>, file: Option<&Path>) -> Result<Value, CliError> {
    let content = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => read_file(path)?,
        (None, None) => return Err(CliError::InvalidTask("either --text or --file is required".into())),
    };
    Ok(parse_output(&content))
}

/// Tags and parse report of `content` as one JSON document
pub fn parse_output(content: &str) -> Value {
    let mut parser = TagParser::new();
    let tags = parser.parse(content);
    let report = parser.last_report();

    json!({
        "tags": tags.iter().map(|t| t.to_json()).collect::<Vec<_>>(),
        "report": {
            "blocks_found": report.blocks_found,
            "blocks_parsed": report.blocks_parsed,
            "success_rate": report.success_rate(),
            "warnings": report.warnings,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_text() {
        let output = run_parse(Some("{mental_state: 'focused', certainty_level: 0.85}".into()), None).unwrap();
        assert_eq!(output["tags"].as_array().unwrap().len(), 2);
        assert_eq!(output["tags"][1]["value"], 0.85);
        assert_eq!(output["report"]["success_rate"], 1.0);
    }

    #[test]
    fn test_parse_file_reports_warnings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{depth: 1.2.3}}\n{{ok: true}}").unwrap();

        let output = run_parse(None, Some(file.path())).unwrap();
        assert_eq!(output["tags"].as_array().unwrap().len(), 1);
        assert_eq!(output["report"]["warnings"][0]["kind"], "invalid_number");
        assert_eq!(output["tags"][0]["position"]["line"], 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = run_parse(None, Some(Path::new("/nonexistent/aethero.txt"))).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }
}
