//! The pluggable task-processing capability.

use aethero_core::{Payload, TaskFailure};
use async_trait::async_trait;
use std::sync::Arc;

/// The one operation a concrete agent variant supplies.
///
/// The surrounding [`crate::Agent`] owns identity, logging and publication;
/// implementations only turn a task into a result.
#[async_trait]
pub trait TaskProcessor: Send + Sync {
    /// Process one task given the caller's annotations.
    async fn process_task(&self, task: &Payload, annotations: &Payload) -> Result<Payload, TaskFailure>;

    /// Short name used in logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

#[async_trait]
impl<T: TaskProcessor + ?Sized> TaskProcessor for Arc<T> {
    async fn process_task(&self, task: &Payload, annotations: &Payload) -> Result<Payload, TaskFailure> {
        (**self).process_task(task, annotations).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: TaskProcessor + ?Sized> TaskProcessor for Box<T> {
    async fn process_task(&self, task: &Payload, annotations: &Payload) -> Result<Payload, TaskFailure> {
        (**self).process_task(task, annotations).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
