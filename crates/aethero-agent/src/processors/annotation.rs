use aethero_core::{Payload, TagParser, TaskFailure};
use async_trait::async_trait;
use serde_json::{Value, json};

use super::required_str;
use crate::processor::TaskProcessor;

/// Extracts tags from `task["content"]`.
///
/// The result carries the tags in their JSON form, `tag_count`, and the
/// parse report. Skipped blocks are reported, not failed.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationProcessor;

impl AnnotationProcessor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TaskProcessor for AnnotationProcessor {
    async fn process_task(&self, task: &Payload, _annotations: &Payload) -> Result<Payload, TaskFailure> {
        let content = required_str(task, "content")?;

        let mut parser = TagParser::new();
        let tags = parser.parse(content);
        let report = parser.last_report();

        let mut result = Payload::new();
        result.insert("tag_count".into(), tags.len().into());
        result.insert(
            "tags".into(),
            Value::Array(tags.iter().map(|t| t.to_json()).collect()),
        );
        result.insert(
            "report".into(),
            json!({
                "blocks_found": report.blocks_found,
                "blocks_parsed": report.blocks_parsed,
                "success_rate": report.success_rate(),
                "warnings": report.warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
            }),
        );
        Ok(result)
    }

    fn name(&self) -> &str {
        "annotation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aethero_core::FailureKind;

    fn task(content: Value) -> Payload {
        let mut task = Payload::new();
        task.insert("content".into(), content);
        task
    }

    #[tokio::test]
    async fn test_extracts_tags_and_report() {
        let result = AnnotationProcessor
            .process_task(
                &task("Note {mental_state: 'focused', certainty_level: 0.85} and {depth: x1}".into()),
                &Payload::new(),
            )
            .await
            .unwrap();

        assert_eq!(result["tag_count"], 3);
        assert_eq!(result["tags"][0]["name"], "mental_state");
        assert_eq!(result["tags"][0]["value"], "focused");
        assert_eq!(result["tags"][1]["value"], 0.85);
        assert_eq!(result["report"]["blocks_found"], 2);
        assert_eq!(result["report"]["success_rate"], 1.0);
    }

    #[tokio::test]
    async fn test_malformed_block_is_reported() {
        let result = AnnotationProcessor
            .process_task(&task("{load: 1.2.3} {ok: true}".into()), &Payload::new())
            .await
            .unwrap();

        assert_eq!(result["tag_count"], 1);
        assert_eq!(result["report"]["blocks_parsed"], 1);
        assert_eq!(result["report"]["warnings"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_content_is_validation_failure() {
        let failure = AnnotationProcessor
            .process_task(&Payload::new(), &Payload::new())
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::Validation);

        let failure = AnnotationProcessor
            .process_task(&task(Value::from(5)), &Payload::new())
            .await
            .unwrap_err();
        assert_eq!(failure.message, "field 'content' must be a string, got number");
    }
}
