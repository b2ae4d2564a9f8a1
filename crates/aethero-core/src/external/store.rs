//! Record store interface and the in-process implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use uuid::Uuid;

use crate::Payload;

/// Identifier generated by a store for each record it accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(id: &str) -> Result<Self, StoreError> {
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|e| StoreError::InvalidId(format!("{id}: {e}")))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors reported by a [`MemoryStore`]
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid record id: {0}")]
    InvalidId(String),

    #[error("record rejected: {0}")]
    Rejected(String),
}

/// Create/read access to the persistent memory store.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Persist a record and return its generated id
    async fn put(&self, record: Payload) -> Result<RecordId, StoreError>;

    /// Load a record by id
    async fn get(&self, id: &RecordId) -> Result<Option<Payload>, StoreError>;
}

/// Transient store backed by a `HashMap`; contents are lost with the process.
///
/// ```rust
/// use aethero_core::external::{InMemoryStore, MemoryStore};
///
/// # tokio_test::block_on(async {
/// let store = InMemoryStore::new();
/// let mut record = serde_json::Map::new();
/// record.insert("kind".into(), "reflection".into());
///
/// let id = store.put(record.clone()).await.unwrap();
/// assert_eq!(store.get(&id).await.unwrap(), Some(record));
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: Arc<RwLock<HashMap<RecordId, Payload>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn put(&self, record: Payload) -> Result<RecordId, StoreError> {
        let id = RecordId::generate();
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Unavailable(format!("Lock poisoned: {e}")))?;
        records.insert(id, record);
        Ok(id)
    }

    async fn get(&self, id: &RecordId) -> Result<Option<Payload>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Unavailable(format!("Lock poisoned: {e}")))?;
        Ok(records.get(id).cloned())
    }
}
