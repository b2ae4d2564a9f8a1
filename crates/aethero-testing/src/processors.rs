//! # Scripted Task Processors
//!
//! [`FlakyProcessor`] fails a configured number of times before succeeding,
//! which drives the retry loop through every branch.

use aethero_agent::TaskProcessor;
use aethero_core::{FailureKind, Payload, TaskFailure};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Processor that fails its first `failures` calls with `kind`, then echoes
#[derive(Debug, Clone)]
pub struct FlakyProcessor {
    failures: u32,
    kind: FailureKind,
    latency: Option<Duration>,
    call_history: Arc<Mutex<Vec<Payload>>>,
}

impl FlakyProcessor {
    /// Fail the first `failures` calls with a processing failure
    pub fn new(failures: u32) -> Self {
        Self {
            failures,
            kind: FailureKind::Processing,
            latency: None,
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Never succeed
    pub fn always_failing(kind: FailureKind) -> Self {
        Self::new(u32::MAX).with_kind(kind)
    }

    /// Always succeed
    pub fn reliable() -> Self {
        Self::new(0)
    }

    pub fn with_kind(mut self, kind: FailureKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sleep for `latency` on every call before answering
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_history.lock().unwrap().len()
    }

    /// Tasks received, in order
    pub fn call_history(&self) -> Vec<Payload> {
        self.call_history.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskProcessor for FlakyProcessor {
    async fn process_task(&self, task: &Payload, annotations: &Payload) -> Result<Payload, TaskFailure> {
        let attempt = {
            let mut history = self.call_history.lock().unwrap();
            history.push(task.clone());
            history.len() as u32
        };

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if attempt <= self.failures {
            return Err(TaskFailure::new(self.kind, format!("scripted failure {attempt}"))
                .with_detail("attempt", attempt));
        }

        let mut result = Payload::new();
        result.insert("attempt".into(), attempt.into());
        result.insert("input".into(), serde_json::Value::Object(task.clone()));
        result.insert("annotations".into(), serde_json::Value::Object(annotations.clone()));
        Ok(result)
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fails_then_succeeds() {
        let processor = FlakyProcessor::new(2).with_kind(FailureKind::Timeout);
        let task = Payload::new();

        let first = processor.process_task(&task, &Payload::new()).await.unwrap_err();
        assert_eq!(first.kind, FailureKind::Timeout);
        assert_eq!(first.message, "scripted failure 1");
        assert!(processor.process_task(&task, &Payload::new()).await.is_err());

        let result = processor.process_task(&task, &Payload::new()).await.unwrap();
        assert_eq!(result["attempt"], 3);
        assert_eq!(processor.call_count(), 3);
    }
}
