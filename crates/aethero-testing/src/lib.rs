//! # Aethero Testing
//!
//! Mock collaborators and a small harness for testing code built on the
//! Aethero runtime.
//!
//! ## Components
//!
//! - **Host metrics**: [`ScriptedHostMetrics`] replays readings and failures
//! - **Recorders**: [`RecordingLogSink`], [`RecordingAlerts`],
//!   [`RecordingNotifications`] and [`RecordingMessages`] keep every call
//! - **Evaluator**: [`StaticEvaluator`] answers with fixed scores
//! - **Processors**: [`FlakyProcessor`] fails a set number of times
//! - **Harness**: [`AgentHarness`] wires agents to a bus and a recording sink
//!
//! ## Usage
//!
//! ```rust
//! use aethero_testing::{AgentHarness, FlakyProcessor, payload};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let harness = AgentHarness::new();
//! let agent = harness.agent("worker", FlakyProcessor::reliable());
//!
//! agent.execute_task(&payload(json!({"task_id": "t-1"})), &Default::default()).await.unwrap();
//!
//! assert_eq!(harness.log_sink().len(), 2);
//! assert_eq!(harness.published_by(&agent).len(), 1);
//! # });
//! ```

/// Static evaluator
pub mod evaluator;
/// Agent test harness
pub mod harness;
/// Scripted host metrics provider
pub mod host;
/// Scripted task processors
pub mod processors;
/// Recording sinks and callbacks
pub mod recorders;

pub use evaluator::StaticEvaluator;
pub use harness::{AgentHarness, payload};
pub use host::ScriptedHostMetrics;
pub use processors::FlakyProcessor;
pub use recorders::{RecordingAlerts, RecordingLogSink, RecordingMessages, RecordingNotifications};
