//! Lifecycle integration: agents, bus subscribers and the monitor together

use aethero_agent::{Agent, AgentConfig, AgentError, AnnotationProcessor, IntrospectionProcessor};
use aethero_core::{
    AgentId, ErrorHandler, LogSink, LogStatus, LogUnit, MonitorConfig, Payload, PipelineId,
    RetryPolicy,
};
use aethero_mesh::MessageBus;
use aethero_observability::{
    AgentStatus, DiskUsage, HostMetricsProvider, HostSnapshot, Monitor, SamplingError,
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Collect(Mutex<Vec<LogUnit>>);

impl LogSink for Collect {
    fn emit(&self, unit: &LogUnit) {
        self.0.lock().unwrap().push(unit.clone());
    }
}

struct QuietHost;

#[async_trait]
impl HostMetricsProvider for QuietHost {
    async fn sample(&self) -> Result<HostSnapshot, SamplingError> {
        Ok(HostSnapshot {
            cpu_percent: 12.0,
            memory_percent: 30.0,
            disk_usage: DiskUsage::from_totals(1000, 400),
        })
    }
}

fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

#[tokio::test]
async fn test_subscriber_receives_agent_output() {
    let bus = Arc::new(MessageBus::default());
    let sink = Arc::new(Collect::default());
    let agent = Agent::new(
        AgentId::parse("annotator").unwrap(),
        AgentConfig::new(PipelineId::parse("ingest").unwrap()),
        AnnotationProcessor::new(),
        bus.clone(),
        sink.clone(),
    );
    let mut subscription = bus.subscribe(agent.output_topic());

    let annotations = payload(json!({"intent_vector": [0.8, 0.2, 0.0]}));
    agent
        .execute_task(
            &payload(json!({"task_id": "doc-7", "content": "{mental_state: 'focused'}"})),
            &annotations,
        )
        .await
        .unwrap();

    let message = subscription.recv().await.unwrap();
    assert_eq!(message.topic.as_str(), "annotator_output");
    assert_eq!(message.content["tag_count"], 1);
    assert_eq!(message.annotations, annotations);

    let units = sink.0.lock().unwrap();
    assert_eq!(units.len(), 2);
    assert!(units.iter().all(|u| u.pipeline_id.as_str() == "ingest"));
    assert_eq!(units[1].status, LogStatus::TaskCompleted);
}

#[tokio::test]
async fn test_agent_counters_reach_monitor() {
    let monitor = Monitor::new(Arc::new(QuietHost), MonitorConfig::default()).unwrap();
    let agent = Agent::new(
        AgentId::parse("introspection").unwrap(),
        AgentConfig::default(),
        IntrospectionProcessor::new(),
        Arc::new(MessageBus::default()),
        Arc::new(Collect::default()),
    );

    let good = payload(json!({"memory_batch": [{"statement": "ok"}]}));
    let bad = payload(json!({"memory_batch": "not a batch"}));
    agent.execute_task(&good, &Payload::new()).await.unwrap();
    agent.execute_task(&good, &Payload::new()).await.unwrap();
    assert!(agent.execute_task(&bad, &Payload::new()).await.is_err());

    let metrics = agent.report_to(&monitor);
    assert_eq!(metrics.tasks_processed, 2);
    assert_eq!(metrics.errors_count, 1);
    assert_eq!(metrics.status, AgentStatus::Failed);

    monitor.collect_metrics().await.unwrap();
    let health = monitor.health().await;
    assert_eq!(health.status.as_str(), "degraded");
    assert_eq!(health.failed_agents, vec![agent.id().clone()]);

    agent.execute_task(&good, &Payload::new()).await.unwrap();
    agent.report_to(&monitor);
    assert!(monitor.health().await.status.is_healthy());
}

#[tokio::test(start_paused = true)]
async fn test_validation_failures_exhaust_configured_policy() {
    let agent = Agent::new(
        AgentId::parse("introspection").unwrap(),
        AgentConfig::default(),
        IntrospectionProcessor::new(),
        Arc::new(MessageBus::default()),
        Arc::new(Collect::default()),
    );
    let mut handler = ErrorHandler::new();
    handler.set_retry_policy(agent.id().clone(), RetryPolicy::new(2, Duration::from_millis(10)));

    let err = agent
        .execute_with_recovery(&Payload::new(), &Payload::new(), &handler)
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::RetryExhausted { attempts: 3, .. }));
    assert_eq!(agent.metrics_report().errors_count, Some(3));
}
