//! # Aethero Agent
//!
//! The agent execution lifecycle. An [`Agent`] is a fixed [`AgentId`], an
//! [`AgentConfig`] and one [`TaskProcessor`]; every task it runs is logged
//! to the injected [`LogSink`] and its result published to the agent's
//! output topic on the shared [`MessageBus`].
//!
//! Failures are returned to the caller unchanged. Callers that want retries
//! use [`Agent::execute_with_recovery`], which routes each failure through an
//! [`ErrorHandler`].
//!
//! ## Example
//!
//! ```rust
//! use aethero_agent::{Agent, AgentConfig, processors::IntrospectionProcessor};
//! use aethero_core::{AgentId, ErrorHandler, TracingLogSink};
//! use aethero_mesh::MessageBus;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let agent = Agent::new(
//!     AgentId::parse("introspection").unwrap(),
//!     AgentConfig::default(),
//!     IntrospectionProcessor::new(),
//!     Arc::new(MessageBus::default()),
//!     Arc::new(TracingLogSink),
//! );
//!
//! let task = json!({"memory_batch": [{"mental_state": "reflective", "cognitive_load": 0.9}]});
//! let result = agent
//!     .execute_with_recovery(task.as_object().unwrap(), &Default::default(), &ErrorHandler::new())
//!     .await
//!     .unwrap();
//!
//! assert_eq!(result["entries_flagged"], 1);
//! # });
//! ```
//!
//! [`AgentId`]: aethero_core::AgentId
//! [`LogSink`]: aethero_core::LogSink
//! [`MessageBus`]: aethero_mesh::MessageBus
//! [`ErrorHandler`]: aethero_core::ErrorHandler

pub mod error;
pub mod lifecycle;
pub mod processor;
pub mod processors;
mod retry;

pub use error::{AgentError, AgentResult};
pub use lifecycle::{Agent, AgentConfig};
pub use processor::TaskProcessor;
pub use processors::{
    AnnotationProcessor, IntrospectionProcessor, ReflectionProcessor, ValidationResult,
    ValidationStatus,
};
