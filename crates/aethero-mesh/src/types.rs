//! Topic names

use aethero_core::{AgentId, IdValidationError, IdValidator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MeshError;

/// Named channel on the bus.
///
/// Topics follow the same character rules as agent ids (alphanumeric,
/// hyphen, underscore, dot), so every agent's output topic is valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    /// Parse and validate a topic from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use aethero_mesh::Topic;
    ///
    /// // Valid topics
    /// assert!(Topic::parse("notifications").is_ok());
    /// assert!(Topic::parse("agent-1_output").is_ok());
    /// assert!(Topic::parse("system.logs").is_ok());
    ///
    /// // Invalid topics
    /// assert!(Topic::parse("").is_err());
    /// assert!(Topic::parse(" topic").is_err());
    /// assert!(Topic::parse("topic/sub").is_err());
    /// ```
    pub fn parse(topic: impl AsRef<str>) -> Result<Self, MeshError> {
        let s = topic.as_ref();
        IdValidator::validate(s)
            .map(|s| Self(s.to_string()))
            .map_err(|source| MeshError::InvalidTopic {
                topic: s.to_string(),
                source,
            })
    }

    /// Topic an agent publishes its results to: `{agent_id}_output`
    pub fn output_of(agent_id: &AgentId) -> Self {
        Self(agent_id.output_topic_name())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Topic {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Topic {
    type Error = IdValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        IdValidator::validate(&s)?;
        Ok(Self(s))
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
