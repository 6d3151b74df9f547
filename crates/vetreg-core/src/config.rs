//! Worker configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the offline worker.
///
/// Cache partitions and the submission queue are explicit named storage
/// handles; nothing in the worker reads ambient globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Name of the runtime cache partition (strategy executors write here).
    pub runtime_cache: String,
    /// Name of the static cache partition (precached resources).
    pub static_cache: String,
    /// Name of the submission queue store.
    pub queue_store: String,
    /// Cache generation marker; partitions without it are deleted on activate.
    pub generation: String,
    /// URLs precached on install.
    pub precache_urls: Vec<String>,
    /// Origin used to resolve relative precache URLs.
    pub origin: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            runtime_cache: "vet-signup-v2".to_string(),
            static_cache: "vet-signup-static-v2".to_string(),
            queue_store: "offline-forms-v1".to_string(),
            generation: "v2".to_string(),
            precache_urls: vec![
                "/".to_string(),
                "/profile".to_string(),
                "/success".to_string(),
                "/offline.html".to_string(),
            ],
            origin: "https://vetreg.example".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Create a configuration with the default partition names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the origin used for precache URL resolution.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Set the precache URL list.
    pub fn with_precache_urls(mut self, urls: Vec<String>) -> Self {
        self.precache_urls = urls;
        self
    }

    /// Whether a cache partition belongs to the current generation.
    ///
    /// The queue store is never subject to generation cleanup.
    pub fn is_current_partition(&self, name: &str) -> bool {
        name.contains(&self.generation)
            || name == self.static_cache
            || name == self.queue_store
    }

    /// Resolve a possibly-relative URL against the configured origin.
    pub fn resolve_url(&self, url: &str) -> String {
        if url.contains("://") {
            url.to_string()
        } else {
            format!("{}{}", self.origin.trim_end_matches('/'), url)
        }
    }
}
