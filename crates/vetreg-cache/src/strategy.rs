//! Strategy executors.

use std::sync::Arc;

use tracing::warn;
use vetreg_core::{Fetch, FetchError, Request, Response};

use crate::rules::Strategy;
use crate::store::{CacheChain, CacheStore, CachedResponse};

/// Executes caching strategies over a shared cache and the network.
///
/// Lookups go through a read chain (runtime partition first, then the static
/// precache partition); writes always land in the runtime partition. Cache
/// storage errors degrade to misses and are logged, never surfaced.
pub struct StrategyExecutor {
    lookup: CacheChain,
    store: Arc<dyn CacheStore>,
    fetch: Arc<dyn Fetch>,
}

impl StrategyExecutor {
    /// Create an executor writing to `store` and reading through `lookup`.
    pub fn new(lookup: CacheChain, store: Arc<dyn CacheStore>, fetch: Arc<dyn Fetch>) -> Self {
        Self {
            lookup,
            store,
            fetch,
        }
    }

    /// Create an executor over a single partition.
    pub fn single(store: Arc<dyn CacheStore>, fetch: Arc<dyn Fetch>) -> Self {
        Self {
            lookup: CacheChain::new(vec![store.clone()]),
            store,
            fetch,
        }
    }

    /// Run the given strategy for a request.
    pub async fn execute(
        &self,
        strategy: Strategy,
        request: &Request,
    ) -> Result<Response, FetchError> {
        match strategy {
            Strategy::CacheFirst => self.cache_first(request).await,
            Strategy::NetworkFirst => self.network_first(request).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request).await,
        }
    }

    /// Cache hit wins; otherwise fetch and store a successful response.
    /// Network failure with no cached entry propagates to the caller.
    pub async fn cache_first(&self, request: &Request) -> Result<Response, FetchError> {
        if let Some(entry) = self.cached(&request.url).await {
            return Ok(entry.response);
        }

        let response = self.fetch.send(request).await?;
        self.store_if_success(&request.url, &response).await;
        Ok(response)
    }

    /// Network wins; a thrown network error falls back to the cache. A cache
    /// miss on the fallback path propagates the original network error.
    pub async fn network_first(&self, request: &Request) -> Result<Response, FetchError> {
        match self.fetch.send(request).await {
            Ok(response) => {
                self.store_if_success(&request.url, &response).await;
                Ok(response)
            }
            Err(err) => match self.cached(&request.url).await {
                Some(entry) => Ok(entry.response),
                None => Err(err),
            },
        }
    }

    /// A cache hit returns immediately while a background fetch refreshes the
    /// entry; background failures are swallowed and never touch the entry.
    /// On a miss the caller waits on the network directly.
    pub async fn stale_while_revalidate(&self, request: &Request) -> Result<Response, FetchError> {
        if let Some(entry) = self.cached(&request.url).await {
            self.spawn_revalidation(request.clone());
            return Ok(entry.response);
        }

        let response = self.fetch.send(request).await?;
        self.store_if_success(&request.url, &response).await;
        Ok(response)
    }

    fn spawn_revalidation(&self, request: Request) {
        let fetch = self.fetch.clone();
        let store = self.store.clone();
        tokio::spawn(async move {
            match fetch.send(&request).await {
                Ok(response) if response.is_success() => {
                    let entry = CachedResponse::capture(&response);
                    if let Err(err) = store.put(&request.url, entry).await {
                        warn!(url = %request.url, error = %err, "revalidation store failed");
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(url = %request.url, error = %err, "background revalidation failed");
                }
            }
        });
    }

    async fn cached(&self, url: &str) -> Option<CachedResponse> {
        match self.lookup.get(url).await {
            Ok(entry) => entry,
            Err(err) => {
                warn!(url, error = %err, "cache lookup failed");
                None
            }
        }
    }

    async fn store_if_success(&self, url: &str, response: &Response) {
        if !response.is_success() {
            return;
        }
        let entry = CachedResponse::capture(response);
        if let Err(err) = self.store.put(url, entry).await {
            warn!(url, error = %err, "cache store failed");
        }
    }
}
