//! Cache storage: named partitions of captured responses.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use vetreg_core::Response;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Failed to serialize/deserialize a cache entry.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Backend storage error.
    #[error("storage error: {0}")]
    Storage(String),
}

/// A cached response entry.
///
/// Only successful (2xx) responses are stored; entries are overwritten in
/// place, never versioned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    /// The captured response.
    pub response: Response,
    /// Unix timestamp (seconds) when the entry was stored.
    pub stored_at: u64,
}

impl CachedResponse {
    /// Capture a response for storage.
    pub fn capture(response: &Response) -> Self {
        Self {
            response: response.clone(),
            stored_at: current_timestamp(),
        }
    }

    /// Age of the entry in seconds.
    pub fn age(&self) -> u64 {
        current_timestamp().saturating_sub(self.stored_at)
    }
}

/// One named cache partition.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a cached response by request URL.
    async fn get(&self, url: &str) -> CacheResult<Option<CachedResponse>>;

    /// Store a response under a request URL, overwriting any existing entry.
    async fn put(&self, url: &str, entry: CachedResponse) -> CacheResult<()>;

    /// Delete an entry.
    async fn delete(&self, url: &str) -> CacheResult<()>;

    /// List all stored URLs.
    async fn keys(&self) -> CacheResult<Vec<String>>;
}

/// In-memory cache partition.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, CachedResponse>>,
}

impl MemoryCacheStore {
    /// Create an empty partition.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, url: &str) -> CacheResult<Option<CachedResponse>> {
        Ok(self.entries.read().await.get(url).cloned())
    }

    async fn put(&self, url: &str, entry: CachedResponse) -> CacheResult<()> {
        self.entries.write().await.insert(url.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, url: &str) -> CacheResult<()> {
        self.entries.write().await.remove(url);
        Ok(())
    }

    async fn keys(&self) -> CacheResult<Vec<String>> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}

/// Registry of named cache partitions.
///
/// The analog of the platform cache registry: partitions are opened lazily by
/// name, enumerated for generation cleanup, and dropped wholesale.
#[async_trait]
pub trait CachePool: Send + Sync {
    /// Open (or create) a partition by name.
    async fn open(&self, name: &str) -> CacheResult<Arc<dyn CacheStore>>;

    /// List all partition names.
    async fn names(&self) -> CacheResult<Vec<String>>;

    /// Delete a partition and all its entries.
    async fn remove(&self, name: &str) -> CacheResult<bool>;
}

/// In-memory partition registry.
#[derive(Default)]
pub struct MemoryCachePool {
    partitions: RwLock<HashMap<String, Arc<MemoryCacheStore>>>,
}

impl MemoryCachePool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CachePool for MemoryCachePool {
    async fn open(&self, name: &str) -> CacheResult<Arc<dyn CacheStore>> {
        let mut partitions = self.partitions.write().await;
        let store = partitions
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryCacheStore::new()))
            .clone();
        Ok(store)
    }

    async fn names(&self) -> CacheResult<Vec<String>> {
        Ok(self.partitions.read().await.keys().cloned().collect())
    }

    async fn remove(&self, name: &str) -> CacheResult<bool> {
        Ok(self.partitions.write().await.remove(name).is_some())
    }
}

/// Read-through chain over several partitions.
///
/// Lookups try each partition in order; the first hit wins. Mirrors a
/// whole-registry match while executors still write to a single partition.
#[derive(Clone)]
pub struct CacheChain {
    stores: Vec<Arc<dyn CacheStore>>,
}

impl CacheChain {
    /// Create a chain from partitions in lookup order.
    pub fn new(stores: Vec<Arc<dyn CacheStore>>) -> Self {
        Self { stores }
    }

    /// Look up a URL across all partitions.
    pub async fn get(&self, url: &str) -> CacheResult<Option<CachedResponse>> {
        for store in &self.stores {
            if let Some(entry) = store.get(url).await? {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
