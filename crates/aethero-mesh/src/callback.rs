//! Callback subscribers

use aethero_core::CallbackResult;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use crate::message::Message;

/// Push-style subscriber invoked for every message published to its topic.
///
/// Failures are logged and counted by the bus; they never reach the publisher.
#[async_trait]
pub trait MessageCallback: Send + Sync {
    async fn on_message(&self, message: &Message) -> CallbackResult;
}

/// Adapter turning an async closure into a [`MessageCallback`]
pub struct FnCallback<F>(F);

#[async_trait]
impl<F, Fut> MessageCallback for FnCallback<F>
where
    F: Fn(Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallbackResult> + Send + 'static,
{
    async fn on_message(&self, message: &Message) -> CallbackResult {
        (self.0)(message.clone()).await
    }
}

/// Wrap an async closure as a callback subscriber.
///
/// ```rust
/// use aethero_mesh::{MessageBus, Topic, callback_fn};
///
/// # tokio_test::block_on(async {
/// let bus = MessageBus::default();
/// let topic = Topic::parse("events").unwrap();
/// bus.add_subscriber(&topic, callback_fn(|message| async move {
///     println!("received {}", message.id);
///     Ok(())
/// }));
/// # });
/// ```
pub fn callback_fn<F, Fut>(f: F) -> Arc<dyn MessageCallback>
where
    F: Fn(Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallbackResult> + Send + 'static,
{
    Arc::new(FnCallback(f))
}
