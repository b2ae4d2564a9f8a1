//! Failure descriptors
//!
//! Task processing signals failure by returning a [`TaskFailure`]: a closed
//! [`FailureKind`] chosen by the producer plus a message and optional
//! structured details. Fan-out callbacks (bus subscribers, alert and
//! notification callbacks) fail with a [`CallbackError`], which is always
//! isolated by the component invoking them.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::Payload;

/// Closed classification of task failures.
///
/// Handlers in [`crate::recovery::ErrorHandler`] are registered per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Task input was rejected
    Validation,
    /// The processing function itself failed
    Processing,
    /// An operation exceeded its time budget
    Timeout,
    /// A host or process resource was unavailable
    Resource,
    /// An external collaborator (store, evaluator, remote service) failed
    External,
    /// Invariant violation inside the runtime
    Internal,
}

impl FailureKind {
    pub const ALL: [FailureKind; 6] = [
        FailureKind::Validation,
        FailureKind::Processing,
        FailureKind::Timeout,
        FailureKind::Resource,
        FailureKind::External,
        FailureKind::Internal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::Processing => "processing",
            FailureKind::Timeout => "timeout",
            FailureKind::Resource => "resource",
            FailureKind::External => "external",
            FailureKind::Internal => "internal",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure returned by a task-processing capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{kind} failure: {message}")]
pub struct TaskFailure {
    pub kind: FailureKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Payload::is_empty")]
    pub details: Payload,
}

impl TaskFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: Payload::new(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Validation, message)
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Processing, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Timeout, message)
    }

    pub fn external(message: impl Into<String>) -> Self {
        Self::new(FailureKind::External, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Internal, message)
    }

    /// Attach a structured detail to the failure
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Failure of a registered callback. Never propagated to the triggering call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("callback failed: {0}")]
pub struct CallbackError(pub String);

impl CallbackError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for CallbackError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for CallbackError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

/// Result type returned by callbacks
pub type CallbackResult = Result<(), CallbackError>;
