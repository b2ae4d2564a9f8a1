//! # Aethero Mesh
//!
//! Topic-based, in-process message bus connecting Aethero agents.
//!
//! ## Features
//!
//! - **Queue subscriptions**: unbounded FIFO queues with broadcast semantics
//! - **Callback subscribers**: async callbacks with per-callback failure isolation
//! - **History**: per-topic, append-only, optionally capped
//! - **Observability**: bounded counters via [`MessageBus::stats`]
//!
//! Ordering is guaranteed per topic only.
//!
//! ## Example
//!
//! ```rust
//! use aethero_mesh::{MessageBus, Topic};
//! use aethero_core::AgentId;
//!
//! # tokio_test::block_on(async {
//! let bus = MessageBus::default();
//! let agent = AgentId::parse("agent-1").unwrap();
//! let topic = Topic::output_of(&agent);
//!
//! let mut subscription = bus.subscribe(&topic);
//! bus.publish(&topic, Default::default(), Default::default()).await;
//! assert!(subscription.try_recv().is_some());
//! # });
//! ```

pub mod bus;
pub mod callback;
pub mod error;
pub mod message;
pub mod metrics;
pub mod types;

pub use bus::{MessageBus, Subscription};
pub use callback::{FnCallback, MessageCallback, callback_fn};
pub use error::{MeshError, MeshResult};
pub use message::{Message, MessageId};
pub use metrics::BusStats;
pub use types::Topic;
