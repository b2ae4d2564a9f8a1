//! Shared task execution lifecycle.
//!
//! Every agent runs tasks through the same sequence: derive the task id,
//! log `task_started`, delegate to its [`TaskProcessor`], then either log
//! `task_completed` and publish the result to `"{agent_id}_output"`, or log
//! `task_failed` and hand the failure back to the caller unchanged.

use aethero_core::{
    AgentId, LogSink, LogStatus, LogUnit, Payload, PipelineId, RuntimeConfig, TaskFailure, TaskId,
};
use aethero_mesh::{MessageBus, Topic};
use aethero_observability::{AgentMetrics, AgentMetricsReport, AgentStatus, Monitor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::processor::TaskProcessor;

/// Static configuration of one agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub pipeline_id: PipelineId,
    /// Free-form settings read by processors
    #[serde(default)]
    pub settings: Payload,
}

impl AgentConfig {
    pub fn new(pipeline_id: PipelineId) -> Self {
        Self {
            pipeline_id,
            settings: Payload::new(),
        }
    }

    /// Agent configuration inheriting the runtime's pipeline id
    pub fn from_runtime(config: &RuntimeConfig) -> Self {
        Self::new(config.pipeline_id.clone())
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone)]
struct ExecutionStats {
    status: AgentStatus,
    tasks_processed: u64,
    errors_count: u64,
    total_processing_time: Duration,
    last_active: Option<DateTime<Utc>>,
}

impl ExecutionStats {
    fn average_seconds(&self) -> f64 {
        let runs = self.tasks_processed + self.errors_count;
        if runs == 0 {
            return 0.0;
        }
        self.total_processing_time.as_secs_f64() / runs as f64
    }
}

/// An identity plus one task processor, wired to a bus and a log sink.
///
/// ```rust
/// use aethero_agent::{Agent, AgentConfig, processors::AnnotationProcessor};
/// use aethero_core::{AgentId, TracingLogSink};
/// use aethero_mesh::MessageBus;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let bus = Arc::new(MessageBus::default());
/// let agent = Agent::new(
///     AgentId::parse("annotator").unwrap(),
///     AgentConfig::default(),
///     AnnotationProcessor::new(),
///     bus.clone(),
///     Arc::new(TracingLogSink),
/// );
///
/// let mut task = serde_json::Map::new();
/// task.insert("content".into(), "{certainty_level: 0.85}".into());
///
/// let result = agent.execute_task(&task, &serde_json::Map::new()).await.unwrap();
/// assert_eq!(result["tag_count"], 1);
/// assert_eq!(bus.get_history(agent.output_topic(), None).len(), 1);
/// # });
/// ```
pub struct Agent<P> {
    id: AgentId,
    config: AgentConfig,
    processor: P,
    output_topic: Topic,
    bus: Arc<MessageBus>,
    log_sink: Arc<dyn LogSink>,
    stats: Mutex<ExecutionStats>,
}

impl<P> std::fmt::Debug for Agent<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("output_topic", &self.output_topic)
            .finish()
    }
}

impl<P: TaskProcessor> Agent<P> {
    pub fn new(
        id: AgentId,
        config: AgentConfig,
        processor: P,
        bus: Arc<MessageBus>,
        log_sink: Arc<dyn LogSink>,
    ) -> Self {
        let output_topic = Topic::output_of(&id);
        Self {
            id,
            config,
            processor,
            output_topic,
            bus,
            log_sink,
            stats: Mutex::new(ExecutionStats {
                status: AgentStatus::Initialized,
                tasks_processed: 0,
                errors_count: 0,
                total_processing_time: Duration::ZERO,
                last_active: None,
            }),
        }
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    /// Topic results are published to
    pub fn output_topic(&self) -> &Topic {
        &self.output_topic
    }

    pub fn status(&self) -> AgentStatus {
        self.lock_stats().status
    }

    /// Run one task through the lifecycle.
    ///
    /// Failures are logged before being returned; nothing is retried here.
    pub async fn execute_task(&self, task: &Payload, annotations: &Payload) -> Result<Payload, TaskFailure> {
        let task_id = TaskId::from_task_data(task);
        self.execute_with_id(&task_id, task, annotations).await
    }

    pub(crate) async fn execute_with_id(
        &self,
        task_id: &TaskId,
        task: &Payload,
        annotations: &Payload,
    ) -> Result<Payload, TaskFailure> {
        self.emit(
            self.log_unit(LogStatus::TaskStarted, task_id)
                .with_metadata("input", Value::Object(task.clone())),
        );
        self.lock_stats().status = AgentStatus::Busy;
        debug!(agent_id = %self.id, task_id = %task_id, processor = self.processor.name(), "Processing task");

        let started = Instant::now();
        let outcome = self.processor.process_task(task, annotations).await;
        let elapsed = started.elapsed();

        match outcome {
            Ok(result) => {
                self.record(elapsed, true);
                self.emit(
                    self.log_unit(LogStatus::TaskCompleted, task_id)
                        .with_metadata("input", Value::Object(task.clone()))
                        .with_metadata("output", Value::Object(result.clone())),
                );

                let message = self
                    .bus
                    .publish(&self.output_topic, result.clone(), annotations.clone())
                    .await;
                info!(
                    agent_id = %self.id,
                    task_id = %task_id,
                    message_id = %message.id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Task completed"
                );
                Ok(result)
            }
            Err(failure) => {
                self.record(elapsed, false);
                self.emit(
                    self.log_unit(LogStatus::TaskFailed, task_id)
                        .with_metadata("error", failure.to_string())
                        .with_metadata("error_kind", failure.kind.as_str())
                        .with_metadata("task_data", Value::Object(task.clone()))
                        .with_metadata("annotations", Value::Object(annotations.clone())),
                );
                warn!(agent_id = %self.id, task_id = %task_id, error = %failure, "Task failed");
                Err(failure)
            }
        }
    }

    /// Current counters in the shape the monitor accepts
    pub fn metrics_report(&self) -> AgentMetricsReport {
        let stats = self.lock_stats();
        AgentMetricsReport {
            status: Some(stats.status),
            tasks_processed: Some(stats.tasks_processed),
            errors_count: Some(stats.errors_count),
            avg_processing_time: Some(stats.average_seconds()),
            last_active: stats.last_active,
            memory_usage: None,
            cpu_usage: None,
        }
    }

    /// Overwrite this agent's record in the monitor
    pub fn report_to(&self, monitor: &Monitor) -> AgentMetrics {
        monitor.update_agent_metrics(&self.id, self.metrics_report())
    }

    pub(crate) fn pipeline_id(&self) -> &PipelineId {
        &self.config.pipeline_id
    }

    fn log_unit(&self, status: LogStatus, task_id: &TaskId) -> LogUnit {
        LogUnit::new(self.config.pipeline_id.clone(), self.id.clone(), status)
            .with_metadata("task_id", task_id.as_str())
    }

    fn emit(&self, unit: LogUnit) {
        self.log_sink.emit(&unit);
    }

    fn record(&self, elapsed: Duration, succeeded: bool) {
        let mut stats = self.lock_stats();
        stats.total_processing_time += elapsed;
        stats.last_active = Some(Utc::now());
        if succeeded {
            stats.tasks_processed += 1;
            stats.status = AgentStatus::Idle;
        } else {
            stats.errors_count += 1;
            stats.status = AgentStatus::Failed;
        }
    }

    fn lock_stats(&self) -> std::sync::MutexGuard<'_, ExecutionStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
