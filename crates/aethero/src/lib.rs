//! # Aethero
//!
//! Aethero is a lightweight runtime for coordinating independent agents that
//! execute tasks, exchange results through a shared topic bus, recover from
//! failures through policy-driven retries, and report health telemetry.
//!
//! ## Core Components
//!
//! - **[TagParser]**: extracts typed `{key: value}` annotations from text
//! - **[Agent]**: an identity plus one [TaskProcessor], wrapped by the shared
//!   execution lifecycle (log, process, publish)
//! - **[MessageBus]**: per-topic ordered delivery to queues and callbacks, with history
//! - **[ErrorHandler]**: failure-kind handlers and per-agent exponential retry
//! - **[Monitor]**: host sampling, per-agent records and threshold alerts
//!
//! ## Quick Start
//!
//! ```rust
//! use aethero::{Agent, AgentConfig, AgentId, AnnotationProcessor, MessageBus, TracingLogSink};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let bus = Arc::new(MessageBus::default());
//! let agent = Agent::new(
//!     AgentId::parse("annotator").unwrap(),
//!     AgentConfig::default(),
//!     AnnotationProcessor::new(),
//!     bus.clone(),
//!     Arc::new(TracingLogSink),
//! );
//! let mut output = bus.subscribe(agent.output_topic());
//!
//! let task = serde_json::json!({"content": "{mental_state: 'focused', certainty_level: 0.85}"});
//! agent.execute_task(task.as_object().unwrap(), &Default::default()).await.unwrap();
//!
//! let message = output.recv().await.unwrap();
//! assert_eq!(message.content["tag_count"], 2);
//! # });
//! ```

// ============================================================================
// Module aliases for namespaced access
// ============================================================================

pub use aethero_agent as agent;
pub use aethero_core as core;
pub use aethero_mesh as mesh;
pub use aethero_observability as observability;

#[cfg(feature = "testing")]
pub use aethero_testing as testing;

// ============================================================================
// Identifiers and payloads
// ============================================================================

pub use aethero_core::{AgentId, IdValidationError, Payload, PipelineId, TaskId};

// ============================================================================
// Tag parsing
// ============================================================================

pub use aethero_core::{
    ParseReport, ParseWarning, Tag, TagParser, TagPosition, TagValue, TagValueKind, create_tag,
    validate_tag_structure,
};

// ============================================================================
// Failures and recovery
// ============================================================================

pub use aethero_core::{
    CallbackError, CallbackResult, ErrorContext, ErrorHandler, ErrorNotification, FailureHandler,
    FailureKind, HandlingOutcome, NotificationCallback, RetryPolicy, TaskFailure,
};

// ============================================================================
// Logging and configuration
// ============================================================================

pub use aethero_core::{LogSink, LogStatus, LogUnit, TracingLogSink};
pub use aethero_core::{
    AlertThresholds, BusConfig, ConfigError, LoggingConfig, MonitorConfig, RuntimeConfig,
    RuntimeConfigBuilder,
};

// ============================================================================
// External collaborators
// ============================================================================

pub use aethero_core::{
    EvaluationCriterion, EvaluationError, EvaluationScores, Evaluator, InMemoryStore, MemoryStore,
    RecordId, StoreError,
};

// ============================================================================
// Message bus
// ============================================================================

pub use aethero_mesh::{
    BusStats, MeshError, Message, MessageBus, MessageCallback, MessageId, Subscription, Topic,
    callback_fn,
};

// ============================================================================
// Agents
// ============================================================================

pub use aethero_agent::{
    Agent, AgentConfig, AgentError, AgentResult, AnnotationProcessor, IntrospectionProcessor,
    ReflectionProcessor, TaskProcessor, ValidationResult, ValidationStatus,
};

// ============================================================================
// Monitoring
// ============================================================================

#[cfg(feature = "sysinfo")]
pub use aethero_observability::SysinfoHostMetrics;
pub use aethero_observability::{
    Alert, AlertCallback, AgentMetrics, AgentMetricsReport, AgentStatus, HealthReport,
    HealthStatus, HostMetricsProvider, HostSnapshot, Monitor, ObservabilityError, SamplingError,
    SystemMetricsSample, init_tracing,
};
