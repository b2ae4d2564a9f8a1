//! Narrow interfaces to collaborators the runtime calls but does not implement
//!
//! - [`MemoryStore`]: persistent record store for agent state, decisions and reflections
//! - [`Evaluator`]: pure scoring service for agent outputs
//!
//! The log sink lives in [`crate::logging`] and the host metrics provider in
//! the observability crate.

mod evaluation;
mod store;

pub use evaluation::{EvaluationCriterion, EvaluationError, EvaluationScores, Evaluator};
pub use store::{InMemoryStore, MemoryStore, RecordId, StoreError};
