//! Validated identifier types shared by every Aethero crate
//!
//! Agents are addressed by [`AgentId`], which doubles as the prefix of the
//! agent's output topic and therefore follows the strict routing rules.
//! [`TaskId`] and [`PipelineId`] are correlation labels taken from caller
//! payloads and only reject empty or padded values.
//!
//! ```rust
//! use aethero_core::identifiers::{AgentId, TaskId};
//!
//! let agent = AgentId::parse("reflection-agent").unwrap();
//! assert_eq!(agent.output_topic_name(), "reflection-agent_output");
//!
//! let task = TaskId::parse("task 42").unwrap();
//! assert_eq!(task.as_str(), "task 42");
//!
//! assert!(AgentId::parse("agent/path").is_err());
//! ```

mod validation;

pub use validation::{
    IdValidationError, IdValidator, MAX_AGENT_ID_LENGTH, MAX_ID_LENGTH, OUTPUT_TOPIC_SUFFIX,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $validate:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse and validate an identifier from a string
            pub fn parse(id: impl AsRef<str>) -> Result<Self, IdValidationError> {
                $validate(id.as_ref()).map(|s| Self(s.to_string()))
            }

            /// Get the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Create an identifier without validation (for testing only)
            #[doc(hidden)]
            pub fn new_unchecked(id: impl Into<String>) -> Self {
                Self(id.into())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

identifier!(
    /// Identity of an agent worker.
    ///
    /// Fixed for the agent's lifetime; used as the key for retry policies and
    /// live metrics, and as the prefix of the `{agent_id}_output` topic.
    AgentId,
    IdValidator::validate_agent
);

identifier!(
    /// Identifier of a single task submitted to an agent.
    TaskId,
    IdValidator::validate_label
);

identifier!(
    /// Caller-supplied correlation id propagated through log units and messages.
    PipelineId,
    IdValidator::validate_label
);

impl AgentId {
    /// Name of the topic this agent publishes its results to
    pub fn output_topic_name(&self) -> String {
        format!("{}{OUTPUT_TOPIC_SUFFIX}", self.0)
    }
}

impl TaskId {
    /// Synthesize a task id from the current wall clock (microseconds since the epoch)
    pub fn from_current_time() -> Self {
        Self(chrono::Utc::now().timestamp_micros().to_string())
    }

    /// Derive the task id from a `task_id` field, falling back to the clock.
    ///
    /// String and numeric values are accepted; anything else (or an invalid
    /// label) synthesizes a fresh id.
    pub fn from_task_data(task: &crate::Payload) -> Self {
        let candidate = match task.get("task_id") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        candidate
            .and_then(|s| Self::parse(s).ok())
            .unwrap_or_else(Self::from_current_time)
    }
}

impl Default for PipelineId {
    fn default() -> Self {
        Self("default".to_string())
    }
}
