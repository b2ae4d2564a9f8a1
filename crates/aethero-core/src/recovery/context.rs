use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Payload;
use crate::failure::{FailureKind, TaskFailure};
use crate::identifiers::{AgentId, PipelineId, TaskId};

/// Key in `additional_data` carrying the number of retries already made
pub const RETRY_COUNT_KEY: &str = "retry_count";

/// Everything known about one failed processing invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorContext {
    pub failure: TaskFailure,
    pub agent_id: AgentId,
    pub task_id: TaskId,
    pub pipeline_id: PipelineId,
    pub timestamp: DateTime<Utc>,
    pub additional_data: Payload,
}

impl ErrorContext {
    pub fn new(failure: TaskFailure, agent_id: AgentId, task_id: TaskId, pipeline_id: PipelineId) -> Self {
        Self {
            failure,
            agent_id,
            task_id,
            pipeline_id,
            timestamp: Utc::now(),
            additional_data: Payload::new(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.failure.kind
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.additional_data.insert(key.into(), value.into());
        self
    }

    pub fn with_retry_count(self, retry_count: u32) -> Self {
        self.with_data(RETRY_COUNT_KEY, retry_count)
    }

    /// Retries already made for this task; 0 when absent or not a count
    pub fn retry_count(&self) -> u32 {
        self.additional_data
            .get(RETRY_COUNT_KEY)
            .and_then(serde_json::Value::as_u64)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(0)
    }
}

/// Summary sent to notification callbacks for unhandled failures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorNotification {
    #[serde(rename = "type")]
    pub notification_type: &'static str,
    pub kind: FailureKind,
    pub agent_id: AgentId,
    pub task_id: TaskId,
    pub pipeline_id: PipelineId,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&ErrorContext> for ErrorNotification {
    fn from(ctx: &ErrorContext) -> Self {
        Self {
            notification_type: "error",
            kind: ctx.failure.kind,
            agent_id: ctx.agent_id.clone(),
            task_id: ctx.task_id.clone(),
            pipeline_id: ctx.pipeline_id.clone(),
            error: ctx.failure.to_string(),
            timestamp: ctx.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> ErrorContext {
        ErrorContext::new(
            TaskFailure::processing("boom"),
            AgentId::new_unchecked("agent-1"),
            TaskId::new_unchecked("task-1"),
            PipelineId::default(),
        )
    }

    #[test]
    fn test_retry_count_defaults_to_zero() {
        assert_eq!(context().retry_count(), 0);
        assert_eq!(context().with_data(RETRY_COUNT_KEY, "two").retry_count(), 0);
        assert_eq!(context().with_data(RETRY_COUNT_KEY, json!(-1)).retry_count(), 0);
    }

    #[test]
    fn test_retry_count_reads_additional_data() {
        assert_eq!(context().with_retry_count(2).retry_count(), 2);
    }

    #[test]
    fn test_notification_shape() {
        let json = serde_json::to_value(ErrorNotification::from(&context())).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["kind"], "processing");
        assert_eq!(json["error"], "processing failure: boom");
        assert_eq!(json["task_id"], "task-1");
    }
}
