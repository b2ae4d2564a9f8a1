//! In-process topic bus

use aethero_core::{BusConfig, Payload};
use chrono::Utc;
use dashmap::DashMap;
use futures::Stream;
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::callback::MessageCallback;
use crate::message::Message;
use crate::metrics::{BusMetricsCollector, BusStats};
use crate::types::Topic;

#[derive(Default)]
struct TopicState {
    history: VecDeque<Message>,
    queues: Vec<mpsc::UnboundedSender<Message>>,
    callbacks: Vec<Arc<dyn MessageCallback>>,
    last_timestamp: Option<chrono::DateTime<Utc>>,
}

/// Receiving end of a queue subscription.
///
/// Yields every message published to the topic after the subscription was
/// created, in publish order. Dropping it unregisters the queue on the next
/// publish.
#[derive(Debug)]
pub struct Subscription {
    topic: Topic,
    receiver: mpsc::UnboundedReceiver<Message>,
}

impl Subscription {
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Wait for the next message. `None` once the bus is dropped.
    pub async fn recv(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }

    /// Take the next message if one is already queued
    pub fn try_recv(&mut self) -> Option<Message> {
        self.receiver.try_recv().ok()
    }

    /// Messages waiting in the queue
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl Stream for Subscription {
    type Item = Message;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

/// Topic-based publish/subscribe bus with per-topic history.
///
/// Each topic's table sits behind its own map entry lock: history append and
/// queue delivery for one publish happen under that lock, so per-topic order
/// is identical in history and in every queue. Callbacks run after the lock
/// is released and may publish themselves.
///
/// ```rust
/// use aethero_mesh::{MessageBus, Topic};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let bus = MessageBus::default();
/// let topic = Topic::parse("results").unwrap();
/// let mut subscription = bus.subscribe(&topic);
///
/// let content = json!({"result": 42}).as_object().cloned().unwrap();
/// bus.publish(&topic, content, Default::default()).await;
///
/// let message = subscription.recv().await.unwrap();
/// assert_eq!(message.content["result"], 42);
/// assert_eq!(bus.get_history(&topic, None).len(), 1);
/// # });
/// ```
pub struct MessageBus {
    topics: DashMap<Topic, TopicState>,
    config: BusConfig,
    metrics: BusMetricsCollector,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

impl std::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBus")
            .field("topics", &self.topics.len())
            .field("config", &self.config)
            .finish()
    }
}

impl MessageBus {
    pub fn new(config: BusConfig) -> Self {
        Self {
            topics: DashMap::new(),
            config,
            metrics: BusMetricsCollector::default(),
        }
    }

    /// Publish `content` to `topic` and return the stored message.
    ///
    /// Callback failures are logged and counted; they never fail the publish.
    pub async fn publish(&self, topic: &Topic, content: Payload, annotations: Payload) -> Message {
        let (message, callbacks) = {
            let mut state = self.topics.entry(topic.clone()).or_default();

            let now = Utc::now();
            let timestamp = match state.last_timestamp {
                Some(last) if last > now => last,
                _ => now,
            };
            state.last_timestamp = Some(timestamp);

            let message = Message::new(topic.clone(), content, annotations, timestamp);

            state.history.push_back(message.clone());
            let mut evicted = 0;
            if let Some(limit) = self.config.history_limit {
                while state.history.len() > limit {
                    state.history.pop_front();
                    evicted += 1;
                }
            }

            let before = state.queues.len();
            state.queues.retain(|queue| queue.send(message.clone()).is_ok());
            let delivered = state.queues.len();
            let pruned = before - delivered;
            if pruned > 0 {
                debug!(topic = %topic, pruned, "Pruned closed subscriber queues");
            }

            self.metrics.record_publish(delivered, pruned, evicted);
            (message, state.callbacks.clone())
        };

        info!(
            topic = %topic,
            message_id = %message.id,
            callbacks = callbacks.len(),
            "Published message"
        );

        for callback in callbacks {
            match callback.on_message(&message).await {
                Ok(()) => self.metrics.record_callback(true),
                Err(e) => {
                    self.metrics.record_callback(false);
                    error!(
                        topic = %topic,
                        message_id = %message.id,
                        error = %e,
                        "Error in subscriber callback"
                    );
                }
            }
        }

        message
    }

    /// Open a new queue on `topic`. Every queue receives every later message.
    pub fn subscribe(&self, topic: &Topic) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.topics
            .entry(topic.clone())
            .or_default()
            .queues
            .push(sender);

        info!(topic = %topic, "New queue subscription");

        Subscription {
            topic: topic.clone(),
            receiver,
        }
    }

    /// Register a callback invoked for every later message on `topic`.
    ///
    /// Callbacks run in registration order.
    pub fn add_subscriber(&self, topic: &Topic, callback: Arc<dyn MessageCallback>) {
        self.topics
            .entry(topic.clone())
            .or_default()
            .callbacks
            .push(callback);

        info!(topic = %topic, "Added callback subscriber");
    }

    /// The most recent `limit` messages on `topic`, oldest first.
    ///
    /// `None` and `Some(0)` both return the full retained history.
    pub fn get_history(&self, topic: &Topic, limit: Option<usize>) -> Vec<Message> {
        let Some(state) = self.topics.get(topic) else {
            return Vec::new();
        };

        let skip = match limit {
            Some(limit) if limit > 0 => state.history.len().saturating_sub(limit),
            _ => 0,
        };
        state.history.iter().skip(skip).cloned().collect()
    }

    /// Drop retained history for one topic, or for all topics when `None`.
    ///
    /// Subscriptions and callbacks are untouched.
    pub fn clear_history(&self, topic: Option<&Topic>) {
        match topic {
            Some(topic) => {
                if let Some(mut state) = self.topics.get_mut(topic) {
                    state.history.clear();
                }
                info!(topic = %topic, "Cleared message history");
            }
            None => {
                for mut state in self.topics.iter_mut() {
                    state.history.clear();
                }
                info!("Cleared message history for all topics");
            }
        }
    }

    /// Live queues plus callbacks registered on `topic`
    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.topics
            .get(topic)
            .map(|state| {
                state.queues.iter().filter(|q| !q.is_closed()).count() + state.callbacks.len()
            })
            .unwrap_or(0)
    }

    /// Topics that have been published or subscribed to, sorted by name
    pub fn topics(&self) -> Vec<Topic> {
        let mut topics: Vec<Topic> = self.topics.iter().map(|entry| entry.key().clone()).collect();
        topics.sort();
        topics
    }

    pub fn stats(&self) -> BusStats {
        self.metrics.snapshot()
    }
}
