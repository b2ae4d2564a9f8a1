//! Structured task-event log units and the sink they are emitted to

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Payload;
use crate::identifiers::{AgentId, PipelineId};

/// Lifecycle event recorded by a log unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    TaskStarted,
    TaskCompleted,
    TaskFailed,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::TaskStarted => "task_started",
            LogStatus::TaskCompleted => "task_completed",
            LogStatus::TaskFailed => "task_failed",
        }
    }
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured lifecycle record. Emitted, never retained in-process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogUnit {
    pub timestamp: DateTime<Utc>,
    pub pipeline_id: PipelineId,
    pub agent_id: AgentId,
    pub status: LogStatus,
    pub metadata: Payload,
}

impl LogUnit {
    pub fn new(pipeline_id: PipelineId, agent_id: AgentId, status: LogStatus) -> Self {
        Self {
            timestamp: Utc::now(),
            pipeline_id,
            agent_id,
            status,
            metadata: Payload::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Destination for log units. Delivery is fire-and-forget.
pub trait LogSink: Send + Sync {
    fn emit(&self, unit: &LogUnit);
}

/// Forwards log units to `tracing` as structured events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn emit(&self, unit: &LogUnit) {
        let metadata = serde_json::Value::Object(unit.metadata.clone());
        match unit.status {
            LogStatus::TaskFailed => tracing::error!(
                pipeline_id = %unit.pipeline_id,
                agent_id = %unit.agent_id,
                status = %unit.status,
                timestamp = %unit.timestamp.to_rfc3339(),
                metadata = %metadata,
                "Task event"
            ),
            _ => tracing::info!(
                pipeline_id = %unit.pipeline_id,
                agent_id = %unit.agent_id,
                status = %unit.status,
                timestamp = %unit.timestamp.to_rfc3339(),
                metadata = %metadata,
                "Task event"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_unit_serialization() {
        let unit = LogUnit::new(
            PipelineId::new_unchecked("pipe"),
            AgentId::new_unchecked("agent-1"),
            LogStatus::TaskStarted,
        )
        .with_metadata("task_id", "t-1");

        let json = serde_json::to_value(&unit).unwrap();
        assert_eq!(json["status"], "task_started");
        assert_eq!(json["pipeline_id"], "pipe");
        assert_eq!(json["metadata"]["task_id"], "t-1");
    }

    #[test]
    fn test_tracing_sink_does_not_panic_without_subscriber() {
        let unit = LogUnit::new(
            PipelineId::default(),
            AgentId::new_unchecked("agent-1"),
            LogStatus::TaskFailed,
        );
        TracingLogSink.emit(&unit);
    }
}
