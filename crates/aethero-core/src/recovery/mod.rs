//! Failure classification and retry decisions
//!
//! [`ErrorHandler::handle_error`] evaluates one failed attempt and returns a
//! [`HandlingOutcome`]. Resolution order:
//!
//! 1. a [`FailureHandler`] registered for the failure's [`FailureKind`]
//! 2. the [`RetryPolicy`] registered for the failing agent
//! 3. fan-out to every [`NotificationCallback`], then a terminal `Error` outcome
//!
//! The handler never loops. Callers re-invoke the task on
//! [`HandlingOutcome::Retry`] and report the next failure with an incremented
//! `retry_count` (see [`ErrorContext::with_retry_count`]).
//!
//! ```rust
//! use aethero_core::identifiers::{AgentId, PipelineId, TaskId};
//! use aethero_core::recovery::{ErrorContext, ErrorHandler, HandlingOutcome, RetryPolicy};
//! use aethero_core::TaskFailure;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let agent = AgentId::parse("worker").unwrap();
//! let mut handler = ErrorHandler::new();
//! handler.set_retry_policy(agent.clone(), RetryPolicy::new(1, Duration::from_millis(1)));
//!
//! let ctx = ErrorContext::new(
//!     TaskFailure::processing("boom"),
//!     agent,
//!     TaskId::parse("t-1").unwrap(),
//!     PipelineId::default(),
//! );
//! assert!(handler.handle_error(&ctx).await.is_retry());
//!
//! let outcome = handler.handle_error(&ctx.with_retry_count(1)).await;
//! assert!(matches!(outcome, HandlingOutcome::RetryExhausted { .. }));
//! # });
//! ```

mod context;
mod outcome;
mod policy;

pub use context::{ErrorContext, ErrorNotification, RETRY_COUNT_KEY};
pub use outcome::{HandlingOutcome, RETRY_EXHAUSTED_MESSAGE};
pub use policy::RetryPolicy;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::failure::{CallbackError, CallbackResult, FailureKind};
use crate::identifiers::AgentId;

/// Custom recovery for one failure kind.
///
/// An `Err` is logged and resolution falls through to the retry policy.
#[async_trait]
pub trait FailureHandler: Send + Sync {
    async fn handle(&self, ctx: &ErrorContext) -> Result<HandlingOutcome, CallbackError>;
}

/// Receives a notification for every failure that is neither handled nor retried.
#[async_trait]
pub trait NotificationCallback: Send + Sync {
    async fn notify(&self, notification: &ErrorNotification) -> CallbackResult;
}

/// Registry of failure handlers, retry policies and notification callbacks.
///
/// Configure with `&mut self`, then share behind an `Arc`.
#[derive(Default)]
pub struct ErrorHandler {
    handlers: HashMap<FailureKind, Arc<dyn FailureHandler>>,
    retry_policies: HashMap<AgentId, RetryPolicy>,
    notifications: Vec<Arc<dyn NotificationCallback>>,
}

impl std::fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHandler")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("retry_policies", &self.retry_policies)
            .field("notifications", &self.notifications.len())
            .finish()
    }
}

impl ErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one failure kind, replacing any previous one
    pub fn register_handler(&mut self, kind: FailureKind, handler: Arc<dyn FailureHandler>) {
        self.handlers.insert(kind, handler);
    }

    pub fn set_retry_policy(&mut self, agent_id: AgentId, policy: RetryPolicy) {
        self.retry_policies.insert(agent_id, policy);
    }

    pub fn retry_policy(&self, agent_id: &AgentId) -> Option<RetryPolicy> {
        self.retry_policies.get(agent_id).copied()
    }

    /// Callbacks run in registration order
    pub fn register_notification_callback(&mut self, callback: Arc<dyn NotificationCallback>) {
        self.notifications.push(callback);
    }

    /// Decide how to proceed after one failed attempt.
    ///
    /// May suspend for the retry back-off before returning
    /// [`HandlingOutcome::Retry`].
    pub async fn handle_error(&self, ctx: &ErrorContext) -> HandlingOutcome {
        error!(
            agent_id = %ctx.agent_id,
            task_id = %ctx.task_id,
            pipeline_id = %ctx.pipeline_id,
            kind = %ctx.failure.kind,
            retry_count = ctx.retry_count(),
            additional_data = %serde_json::Value::Object(ctx.additional_data.clone()),
            "Error in agent {}: {}",
            ctx.agent_id,
            ctx.failure
        );

        if let Some(handler) = self.handlers.get(&ctx.failure.kind) {
            match handler.handle(ctx).await {
                Ok(outcome) => return outcome,
                Err(e) => error!(
                    kind = %ctx.failure.kind,
                    task_id = %ctx.task_id,
                    error = %e,
                    "Failure handler failed"
                ),
            }
        }

        if let Some(policy) = self.retry_policies.get(&ctx.agent_id) {
            return Self::retry(ctx, *policy).await;
        }

        self.send_notifications(ctx).await;

        HandlingOutcome::Error {
            kind: ctx.failure.kind,
            message: ctx.failure.message.clone(),
            task_id: ctx.task_id.clone(),
            agent_id: ctx.agent_id.clone(),
            timestamp: ctx.timestamp,
        }
    }

    async fn retry(ctx: &ErrorContext, policy: RetryPolicy) -> HandlingOutcome {
        let current = ctx.retry_count();

        if !policy.allows(current) {
            warn!(
                agent_id = %ctx.agent_id,
                task_id = %ctx.task_id,
                max_retries = policy.max_retries,
                "Retries exhausted"
            );
            return HandlingOutcome::exhausted(ctx.task_id.clone(), ctx.agent_id.clone());
        }

        info!(
            agent_id = %ctx.agent_id,
            task_id = %ctx.task_id,
            "Retrying task. Attempt {}/{}",
            current + 1,
            policy.max_retries
        );

        let delay = policy.delay_for(current);
        tokio::time::sleep(delay).await;

        HandlingOutcome::Retry {
            retry_count: current + 1,
            delay,
            next_retry_delay: delay.saturating_mul(2),
            task_id: ctx.task_id.clone(),
        }
    }

    async fn send_notifications(&self, ctx: &ErrorContext) {
        if self.notifications.is_empty() {
            return;
        }

        let notification = ErrorNotification::from(ctx);
        for callback in &self.notifications {
            if let Err(e) = callback.notify(&notification).await {
                error!(
                    task_id = %ctx.task_id,
                    error = %e,
                    "Notification callback failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::TaskFailure;
    use crate::identifiers::{PipelineId, TaskId};
    use crate::Payload;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    struct FixedHandler;

    #[async_trait]
    impl FailureHandler for FixedHandler {
        async fn handle(&self, ctx: &ErrorContext) -> Result<HandlingOutcome, CallbackError> {
            let mut payload = Payload::new();
            payload.insert("task_id".into(), ctx.task_id.as_str().into());
            Ok(HandlingOutcome::Handled(payload))
        }
    }

    struct BrokenHandler;

    #[async_trait]
    impl FailureHandler for BrokenHandler {
        async fn handle(&self, _ctx: &ErrorContext) -> Result<HandlingOutcome, CallbackError> {
            Err(CallbackError::new("handler crashed"))
        }
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<ErrorNotification>>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationCallback for Recorder {
        async fn notify(&self, notification: &ErrorNotification) -> CallbackResult {
            self.seen.lock().unwrap().push(notification.clone());
            if self.fail {
                Err(CallbackError::new("notifier down"))
            } else {
                Ok(())
            }
        }
    }

    fn agent() -> AgentId {
        AgentId::new_unchecked("agent-1")
    }

    fn context(failure: TaskFailure) -> ErrorContext {
        ErrorContext::new(
            failure,
            agent(),
            TaskId::new_unchecked("task-1"),
            PipelineId::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_backoff_sequence() {
        let mut handler = ErrorHandler::new();
        handler.set_retry_policy(agent(), RetryPolicy::new(3, Duration::from_secs(1)));

        let ctx = context(TaskFailure::processing("boom"));
        let mut delays = Vec::new();
        for attempt in 0..3 {
            let start = Instant::now();
            let outcome = handler.handle_error(&ctx.clone().with_retry_count(attempt)).await;
            match outcome {
                HandlingOutcome::Retry {
                    retry_count,
                    delay,
                    next_retry_delay,
                    ..
                } => {
                    assert_eq!(retry_count, attempt + 1);
                    assert_eq!(next_retry_delay, delay * 2);
                    assert_eq!(start.elapsed(), delay);
                    delays.push(delay);
                }
                other => panic!("expected retry, got {other:?}"),
            }
        }
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );

        let start = Instant::now();
        let outcome = handler.handle_error(&ctx.with_retry_count(3)).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        match outcome {
            HandlingOutcome::RetryExhausted { message, agent_id, .. } => {
                assert_eq!(message, RETRY_EXHAUSTED_MESSAGE);
                assert_eq!(agent_id, agent());
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_registered_handler_wins_over_policy() {
        let mut handler = ErrorHandler::new();
        handler.register_handler(FailureKind::Validation, Arc::new(FixedHandler));
        handler.set_retry_policy(agent(), RetryPolicy::new(3, Duration::from_secs(60)));

        let outcome = handler
            .handle_error(&context(TaskFailure::validation("bad input")))
            .await;
        assert_eq!(outcome.status(), "handled");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_handler_falls_through_to_policy() {
        let mut handler = ErrorHandler::new();
        handler.register_handler(FailureKind::Processing, Arc::new(BrokenHandler));
        handler.set_retry_policy(agent(), RetryPolicy::new(1, Duration::from_millis(5)));

        let outcome = handler
            .handle_error(&context(TaskFailure::processing("boom")))
            .await;
        assert!(outcome.is_retry());
    }

    #[tokio::test]
    async fn test_unhandled_failure_notifies_all_callbacks() {
        let failing = Arc::new(Recorder {
            fail: true,
            ..Recorder::default()
        });
        let healthy = Arc::new(Recorder::default());

        let mut handler = ErrorHandler::new();
        handler.register_notification_callback(failing.clone());
        handler.register_notification_callback(healthy.clone());

        let outcome = handler
            .handle_error(&context(TaskFailure::timeout("too slow")))
            .await;

        match outcome {
            HandlingOutcome::Error { kind, message, .. } => {
                assert_eq!(kind, FailureKind::Timeout);
                assert_eq!(message, "too slow");
            }
            other => panic!("expected error, got {other:?}"),
        }
        assert_eq!(failing.seen.lock().unwrap().len(), 1);
        let seen = healthy.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].task_id.as_str(), "task-1");
    }

    #[tokio::test]
    async fn test_retried_failures_do_not_notify() {
        let recorder = Arc::new(Recorder::default());
        let mut handler = ErrorHandler::new();
        handler.register_notification_callback(recorder.clone());
        handler.set_retry_policy(agent(), RetryPolicy::new(0, Duration::ZERO));

        let outcome = handler
            .handle_error(&context(TaskFailure::processing("boom")))
            .await;
        assert!(matches!(outcome, HandlingOutcome::RetryExhausted { .. }));
        assert!(recorder.seen.lock().unwrap().is_empty());
    }
}
