use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::time::Duration;

use crate::Payload;
use crate::failure::FailureKind;
use crate::identifiers::{AgentId, TaskId};

/// Message carried by [`HandlingOutcome::RetryExhausted`]
pub const RETRY_EXHAUSTED_MESSAGE: &str = "max retries exceeded";

/// Decision returned by [`super::ErrorHandler::handle_error`].
///
/// Serialises as a map with a `status` field: `handled`, `retry`, or
/// `error` (shared by the exhausted and terminal variants).
#[derive(Debug, Clone, PartialEq)]
pub enum HandlingOutcome {
    /// A registered handler dealt with the failure
    Handled(Payload),
    /// The caller should re-invoke the task; the back-off has already elapsed
    Retry {
        retry_count: u32,
        delay: Duration,
        /// Advisory only; the next attempt recomputes its delay from the policy
        next_retry_delay: Duration,
        task_id: TaskId,
    },
    RetryExhausted {
        message: String,
        task_id: TaskId,
        agent_id: AgentId,
    },
    Error {
        kind: FailureKind,
        message: String,
        task_id: TaskId,
        agent_id: AgentId,
        timestamp: DateTime<Utc>,
    },
}

impl HandlingOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            HandlingOutcome::Handled(_) => "handled",
            HandlingOutcome::Retry { .. } => "retry",
            HandlingOutcome::RetryExhausted { .. } | HandlingOutcome::Error { .. } => "error",
        }
    }

    pub fn is_retry(&self) -> bool {
        matches!(self, HandlingOutcome::Retry { .. })
    }

    pub(crate) fn exhausted(task_id: TaskId, agent_id: AgentId) -> Self {
        HandlingOutcome::RetryExhausted {
            message: RETRY_EXHAUSTED_MESSAGE.to_string(),
            task_id,
            agent_id,
        }
    }
}

impl Serialize for HandlingOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("status", self.status())?;
        match self {
            HandlingOutcome::Handled(payload) => {
                for (key, value) in payload.iter().filter(|(key, _)| key.as_str() != "status") {
                    map.serialize_entry(key, value)?;
                }
            }
            HandlingOutcome::Retry {
                retry_count,
                delay,
                next_retry_delay,
                task_id,
            } => {
                map.serialize_entry("retry_count", retry_count)?;
                map.serialize_entry("delay_secs", &delay.as_secs_f64())?;
                map.serialize_entry("next_retry_delay_secs", &next_retry_delay.as_secs_f64())?;
                map.serialize_entry("task_id", task_id)?;
            }
            HandlingOutcome::RetryExhausted {
                message,
                task_id,
                agent_id,
            } => {
                map.serialize_entry("message", message)?;
                map.serialize_entry("task_id", task_id)?;
                map.serialize_entry("agent_id", agent_id)?;
            }
            HandlingOutcome::Error {
                kind,
                message,
                task_id,
                agent_id,
                timestamp,
            } => {
                map.serialize_entry("error_type", kind)?;
                map.serialize_entry("message", message)?;
                map.serialize_entry("task_id", task_id)?;
                map.serialize_entry("agent_id", agent_id)?;
                map.serialize_entry("timestamp", timestamp)?;
            }
        }
        map.end()
    }
}
