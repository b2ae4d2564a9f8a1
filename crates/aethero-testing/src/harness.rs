//! # Agent Test Harness
//!
//! Wires agents to a fresh [`MessageBus`] and a shared
//! [`RecordingLogSink`] so tests can run tasks and inspect what was logged
//! and published without repeating the setup.

use aethero_agent::{Agent, AgentConfig, TaskProcessor};
use aethero_core::{AgentId, BusConfig, Payload, PipelineId};
use aethero_mesh::{Message, MessageBus};
use serde_json::Value;
use std::sync::Arc;

use crate::RecordingLogSink;

/// Shared bus and log sink for the agents of one test
#[derive(Debug, Clone)]
pub struct AgentHarness {
    bus: Arc<MessageBus>,
    log_sink: RecordingLogSink,
    pipeline_id: PipelineId,
}

impl AgentHarness {
    pub fn new() -> Self {
        Self::with_bus_config(BusConfig::default())
    }

    /// Harness whose bus uses `config`
    pub fn with_bus_config(config: BusConfig) -> Self {
        Self {
            bus: Arc::new(MessageBus::new(config)),
            log_sink: RecordingLogSink::new(),
            pipeline_id: PipelineId::new_unchecked("test-pipeline"),
        }
    }

    /// Pipeline id given to agents built afterwards
    pub fn with_pipeline(mut self, pipeline_id: &str) -> Self {
        self.pipeline_id = PipelineId::parse(pipeline_id).expect("valid pipeline id");
        self
    }

    /// Build an agent on the harness bus and sink
    pub fn agent<P: TaskProcessor>(&self, agent_id: &str, processor: P) -> Agent<P> {
        Agent::new(
            AgentId::parse(agent_id).expect("valid agent id"),
            AgentConfig::new(self.pipeline_id.clone()),
            processor,
            Arc::clone(&self.bus),
            Arc::new(self.log_sink.clone()),
        )
    }

    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }

    pub fn log_sink(&self) -> &RecordingLogSink {
        &self.log_sink
    }

    pub fn pipeline_id(&self) -> &PipelineId {
        &self.pipeline_id
    }

    /// Everything an agent has published, oldest first
    pub fn published_by<P: TaskProcessor>(&self, agent: &Agent<P>) -> Vec<Message> {
        self.bus.get_history(agent.output_topic(), None)
    }
}

impl Default for AgentHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a `json!` object literal into a [`Payload`]
///
/// # Panics
///
/// If `value` is not a JSON object.
pub fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
