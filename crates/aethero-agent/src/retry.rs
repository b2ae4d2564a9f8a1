//! Caller-side recovery loop

use aethero_core::{ErrorContext, ErrorHandler, HandlingOutcome, Payload, TaskFailure, TaskId};
use tracing::{debug, warn};

use crate::error::{AgentError, AgentResult};
use crate::lifecycle::Agent;
use crate::processor::TaskProcessor;

impl<P: TaskProcessor> Agent<P> {
    /// Execute a task, routing each failure through `handler` until it
    /// succeeds, is handled, or the handler gives up.
    ///
    /// The attempt index is passed to the handler as `retry_count`; the
    /// handler's back-off has already elapsed when it answers `Retry`.
    /// The index only moves forward and is capped by the agent's retry
    /// policy, or the default policy when none is set.
    pub async fn execute_with_recovery(
        &self,
        task: &Payload,
        annotations: &Payload,
        handler: &ErrorHandler,
    ) -> AgentResult<Payload> {
        let task_id = TaskId::from_task_data(task);
        let max_retries = handler
            .retry_policy(self.id())
            .unwrap_or_default()
            .max_retries;
        let mut attempt: u32 = 0;

        loop {
            let failure = match self.execute_with_id(&task_id, task, annotations).await {
                Ok(result) => return Ok(result),
                Err(failure) => failure,
            };

            let ctx = ErrorContext::new(
                failure.clone(),
                self.id().clone(),
                task_id.clone(),
                self.pipeline_id().clone(),
            )
            .with_retry_count(attempt);

            match handler.handle_error(&ctx).await {
                HandlingOutcome::Retry { retry_count, delay, .. } => {
                    debug!(
                        agent_id = %self.id(),
                        task_id = %task_id,
                        retry_count,
                        delay_ms = delay.as_millis() as u64,
                        "Re-invoking task"
                    );
                    attempt = retry_count.max(attempt.saturating_add(1));
                    if attempt > max_retries {
                        return Err(self.give_up(task_id, attempt, failure));
                    }
                }
                HandlingOutcome::Handled(payload) => return Ok(payload),
                HandlingOutcome::RetryExhausted { .. } => {
                    return Err(self.give_up(task_id, attempt.saturating_add(1), failure));
                }
                HandlingOutcome::Error {
                    kind,
                    message,
                    task_id,
                    agent_id,
                    ..
                } => {
                    return Err(AgentError::Unrecovered {
                        agent_id,
                        task_id,
                        kind,
                        message,
                    });
                }
            }
        }
    }

    fn give_up(&self, task_id: TaskId, attempts: u32, last_failure: TaskFailure) -> AgentError {
        warn!(agent_id = %self.id(), task_id = %task_id, attempts, "Giving up on task");
        AgentError::RetryExhausted {
            agent_id: self.id().clone(),
            task_id,
            attempts,
            last_failure,
        }
    }
}
