//! Queue storage.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::record::{QueuedSubmission, SubmissionId};

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Queue storage errors.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// Failed to serialize/deserialize a record.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Backend storage error.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Durable store of queued submissions.
///
/// The store owns records exclusively; nothing else mutates them.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Insert or overwrite a record.
    async fn put(&self, record: QueuedSubmission) -> QueueResult<()>;

    /// Fetch a record by id.
    async fn get(&self, id: &SubmissionId) -> QueueResult<Option<QueuedSubmission>>;

    /// Delete a record; returns whether it existed.
    async fn delete(&self, id: &SubmissionId) -> QueueResult<bool>;

    /// List all records, oldest first.
    async fn list(&self) -> QueueResult<Vec<QueuedSubmission>>;
}

/// In-memory queue store.
#[derive(Default)]
pub struct MemoryQueueStore {
    records: RwLock<HashMap<SubmissionId, QueuedSubmission>>,
}

impl MemoryQueueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueueStore for MemoryQueueStore {
    async fn put(&self, record: QueuedSubmission) -> QueueResult<()> {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record);
        Ok(())
    }

    async fn get(&self, id: &SubmissionId) -> QueueResult<Option<QueuedSubmission>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn delete(&self, id: &SubmissionId) -> QueueResult<bool> {
        Ok(self.records.write().await.remove(id).is_some())
    }

    async fn list(&self) -> QueueResult<Vec<QueuedSubmission>> {
        let mut records: Vec<_> = self.records.read().await.values().cloned().collect();
        records.sort_by_key(|r| r.timestamp);
        Ok(records)
    }
}
