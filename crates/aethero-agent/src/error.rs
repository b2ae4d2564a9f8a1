//! Error types for agent execution.

use aethero_core::{AgentId, FailureKind, TaskFailure, TaskId};
use thiserror::Error;

/// Errors surfaced by [`crate::Agent::execute_with_recovery`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgentError {
    /// The agent's retry policy ran out of attempts.
    #[error("Task {task_id} on agent {agent_id} failed after {attempts} attempts: {last_failure}")]
    RetryExhausted {
        agent_id: AgentId,
        task_id: TaskId,
        attempts: u32,
        last_failure: TaskFailure,
    },

    /// The error handler had neither a handler nor a retry policy for the failure.
    #[error("Unrecovered {kind} failure in task {task_id} on agent {agent_id}: {message}")]
    Unrecovered {
        agent_id: AgentId,
        task_id: TaskId,
        kind: FailureKind,
        message: String,
    },
}

impl AgentError {
    /// Check if a later attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AgentError::RetryExhausted { .. } => false,
            AgentError::Unrecovered { kind, .. } => matches!(
                kind,
                FailureKind::Timeout | FailureKind::Resource | FailureKind::External
            ),
        }
    }

    /// Get the error code suitable for logging or reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            AgentError::RetryExhausted { .. } => "RETRY_EXHAUSTED",
            AgentError::Unrecovered { .. } => "UNRECOVERED",
        }
    }

    /// Failure kind of the underlying task failure
    pub fn kind(&self) -> FailureKind {
        match self {
            AgentError::RetryExhausted { last_failure, .. } => last_failure.kind,
            AgentError::Unrecovered { kind, .. } => *kind,
        }
    }
}

/// Result type for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;
