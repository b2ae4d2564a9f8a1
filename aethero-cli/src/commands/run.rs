//! `aethero run`: execute one task through an agent with configured retries

use aethero::{
    Agent, AgentId, AnnotationProcessor, ErrorHandler, IntrospectionProcessor, MessageBus, Payload,
    RuntimeConfig, TaskProcessor, TracingLogSink,
};
use clap::ValueEnum;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::error::CliError;

/// Built-in processor to run the task with
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AgentKind {
    Introspection,
    Annotation,
}

impl AgentKind {
    fn agent_id(self) -> &'static str {
        match self {
            AgentKind::Introspection => "introspection",
            AgentKind::Annotation => "annotation",
        }
    }

    fn processor(self) -> Box<dyn TaskProcessor> {
        match self {
            AgentKind::Introspection => Box::new(IntrospectionProcessor::new()),
            AgentKind::Annotation => Box::new(AnnotationProcessor::new()),
        }
    }
}

/// Decode a task document; it must be a JSON object
pub fn task_from_json(source: &str) -> Result<Payload, CliError> {
    match serde_json::from_str::<Value>(source)? {
        Value::Object(task) => Ok(task),
        other => Err(CliError::InvalidTask(format!("expected a JSON object, got {other}"))),
    }
}

/// Run `task` and return everything the agent published
pub async fn run_task(
    config: &RuntimeConfig,
    kind: AgentKind,
    task: Payload,
    annotations: Payload,
) -> Result<Value, CliError> {
    let bus = Arc::new(MessageBus::new(config.bus.clone()));
    let agent = Agent::new(
        AgentId::parse(kind.agent_id())?,
        aethero::AgentConfig::from_runtime(config),
        kind.processor(),
        Arc::clone(&bus),
        Arc::new(TracingLogSink),
    );

    let mut handler = ErrorHandler::new();
    for (agent_id, policy) in config.agent_retry_policies() {
        handler.set_retry_policy(agent_id, policy);
    }

    let result = agent.execute_with_recovery(&task, &annotations, &handler).await?;
    let published = bus.get_history(agent.output_topic(), None);

    Ok(json!({
        "result": result,
        "published": published,
    }))
}
