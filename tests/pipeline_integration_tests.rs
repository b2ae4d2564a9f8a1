//! End-to-end pipeline tests
//!
//! Agents chained over the bus, recovery through the error handler, and
//! agent counters flowing into the monitor.

use aethero_testing::{
    AgentHarness, FlakyProcessor, RecordingNotifications, ScriptedHostMetrics, StaticEvaluator,
    payload,
};
use aethero_workspace::{
    AgentError, AgentStatus, AnnotationProcessor, ErrorHandler, FailureKind, InMemoryStore,
    LogStatus, MemoryStore, Monitor, MonitorConfig, Payload, RecordId, ReflectionProcessor,
    RetryPolicy,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_annotation_output_feeds_reflection() {
    let harness = AgentHarness::new().with_pipeline("review");
    let store = Arc::new(InMemoryStore::new());
    let evaluator = StaticEvaluator::uniform(0.9);

    let annotator = harness.agent("annotator", AnnotationProcessor::new());
    let reviewer = harness.agent(
        "reviewer",
        ReflectionProcessor::new(Arc::new(evaluator.clone()), store.clone()),
    );
    let mut annotated = harness.bus().subscribe(annotator.output_topic());

    let annotations = payload(json!({"context_depth": 3}));
    annotator
        .execute_task(
            &payload(json!({"task_id": "doc-1", "content": "{mental_state: 'calm', certainty_level: 0.9}"})),
            &annotations,
        )
        .await
        .unwrap();

    let message = annotated.recv().await.unwrap();
    let review_task = payload(json!({
        "task_id": "review-doc-1",
        "agent_id": annotator.id().as_str(),
        "output": Value::Object(message.content.clone()),
    }));
    let review = reviewer
        .execute_task(&review_task, &message.annotations)
        .await
        .unwrap();

    assert_eq!(review["status"], "passed");
    assert_eq!(evaluator.call_count(), 1);
    assert_eq!(evaluator.call_history()[0].0["tag_count"], 2);

    let record_id = RecordId::parse(review["record_id"].as_str().unwrap()).unwrap();
    let record = store.get(&record_id).await.unwrap().unwrap();
    assert_eq!(record["agent_id"], "annotator");

    let published = harness.published_by(&reviewer);
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].annotations, annotations);

    let statuses = harness.log_sink().statuses();
    assert_eq!(statuses.iter().filter(|s| **s == LogStatus::TaskCompleted).count(), 2);
    assert!(harness.log_sink().units().iter().all(|u| u.pipeline_id.as_str() == "review"));
}

#[tokio::test(start_paused = true)]
async fn test_retry_policy_recovers_transient_failure() {
    let harness = AgentHarness::new();
    let processor = FlakyProcessor::new(2).with_kind(FailureKind::Timeout);
    let agent = harness.agent("worker", processor.clone());

    let notifications = RecordingNotifications::new();
    let mut handler = ErrorHandler::new();
    handler.set_retry_policy(agent.id().clone(), RetryPolicy::new(3, Duration::from_millis(100)));
    handler.register_notification_callback(Arc::new(notifications.clone()));

    let result = agent
        .execute_with_recovery(&payload(json!({"task_id": "t-9"})), &Payload::new(), &handler)
        .await
        .unwrap();

    assert_eq!(result["attempt"], 3);
    assert_eq!(processor.call_count(), 3);
    assert_eq!(notifications.count(), 0);
    assert_eq!(harness.published_by(&agent).len(), 1);

    let failed = harness
        .log_sink()
        .units()
        .into_iter()
        .filter(|u| u.status == LogStatus::TaskFailed)
        .count();
    assert_eq!(failed, 2);
    assert!(harness.log_sink().units().iter().all(|u| u.metadata["task_id"] == "t-9"));
}

#[tokio::test]
async fn test_unhandled_failure_notifies_and_propagates() {
    let harness = AgentHarness::new();
    let agent = harness.agent("worker", FlakyProcessor::always_failing(FailureKind::Resource));

    let notifications = RecordingNotifications::new();
    let mut handler = ErrorHandler::new();
    handler.register_notification_callback(Arc::new(RecordingNotifications::failing()));
    handler.register_notification_callback(Arc::new(notifications.clone()));

    let err = agent
        .execute_with_recovery(&payload(json!({"task_id": "t-2"})), &Payload::new(), &handler)
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::Unrecovered { kind: FailureKind::Resource, .. }));
    assert!(err.is_retryable());

    let sent = notifications.notifications();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].agent_id.as_str(), "worker");
    assert_eq!(sent[0].task_id.as_str(), "t-2");
    assert!(harness.published_by(&agent).is_empty());
}

#[tokio::test]
async fn test_agents_report_to_monitor() {
    let harness = AgentHarness::new();
    let monitor = Monitor::new(Arc::new(ScriptedHostMetrics::new()), MonitorConfig::default()).unwrap();

    let steady = harness.agent("steady", FlakyProcessor::reliable());
    let broken = harness.agent("broken", FlakyProcessor::always_failing(FailureKind::Processing));

    for _ in 0..3 {
        steady.execute_task(&Payload::new(), &Payload::new()).await.unwrap();
        let _ = broken.execute_task(&Payload::new(), &Payload::new()).await;
    }
    steady.report_to(&monitor);
    broken.report_to(&monitor);

    let all = monitor.all_agent_metrics();
    assert_eq!(all.len(), 2);
    assert_eq!(all[steady.id()].tasks_processed, 3);
    assert_eq!(all[steady.id()].status, AgentStatus::Idle);
    assert_eq!(all[broken.id()].errors_count, 3);

    monitor.collect_metrics().await.unwrap();
    let health = monitor.health().await;
    assert_eq!(health.failed_agents, vec![broken.id().clone()]);
    assert_eq!(health.agents_tracked, 2);
}
