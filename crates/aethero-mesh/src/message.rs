//! Messages carried by the bus

use aethero_core::Payload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::MeshError;
use crate::types::Topic;

/// Unique identifier for a message (UUID v4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Create a new random message ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse and validate a message ID from a string
    pub fn parse(s: &str) -> Result<Self, MeshError> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| MeshError::InvalidMessageId(s.to_string()))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message published to a topic.
///
/// Immutable once created; every subscriber receives its own clone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub topic: Topic,
    pub content: Payload,
    #[serde(default)]
    pub annotations: Payload,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub(crate) fn new(
        topic: Topic,
        content: Payload,
        annotations: Payload,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            topic,
            content,
            annotations,
            timestamp,
        }
    }

    /// Look up a content field
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.content.get(key)
    }

    pub fn to_json(&self) -> Result<String, MeshError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_id_parse() {
        let id = MessageId::new();
        assert_eq!(MessageId::parse(&id.to_string()).unwrap(), id);
        assert!(matches!(
            MessageId::parse("msg-1"),
            Err(MeshError::InvalidMessageId(_))
        ));
    }

    #[test]
    fn test_message_json_shape() {
        let mut content = Payload::new();
        content.insert("result".into(), json!(42));
        let message = Message::new(
            Topic::parse("results").unwrap(),
            content,
            Payload::new(),
            Utc::now(),
        );

        let value: serde_json::Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();
        assert_eq!(value["topic"], "results");
        assert_eq!(value["content"]["result"], 42);
        assert_eq!(message.get("result"), Some(&json!(42)));
    }
}
