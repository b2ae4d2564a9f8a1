//! # Aethero Core
//!
//! Shared building blocks for the Aethero agent runtime: validated
//! identifiers, the tag-annotation parser, failure descriptors and the
//! retry/recovery handler, structured log units, runtime configuration and
//! the narrow interfaces to external collaborators.

pub mod config;
pub mod external;
pub mod failure;
pub mod identifiers;
pub mod logging;
pub mod recovery;
pub mod tags;

/// Free-form JSON object used for task data, annotations and results
pub type Payload = serde_json::Map<String, serde_json::Value>;

pub use config::{
    AlertThresholds, BusConfig, ConfigError, LoggingConfig, MonitorConfig, RuntimeConfig,
    RuntimeConfigBuilder,
};
pub use external::{
    EvaluationCriterion, EvaluationError, EvaluationScores, Evaluator, InMemoryStore, MemoryStore,
    RecordId, StoreError,
};
pub use failure::{CallbackError, CallbackResult, FailureKind, TaskFailure};
pub use identifiers::{AgentId, IdValidationError, IdValidator, PipelineId, TaskId};
pub use logging::{LogSink, LogStatus, LogUnit, TracingLogSink};
pub use recovery::{
    ErrorContext, ErrorHandler, ErrorNotification, FailureHandler, HandlingOutcome,
    NotificationCallback, RetryPolicy,
};
pub use tags::{
    ParseReport, ParseWarning, Tag, TagParser, TagPosition, TagValue, TagValueKind, create_tag,
    validate_tag_structure,
};
