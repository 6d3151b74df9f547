//! Worker orchestration over the lifecycle events.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{info, warn};
use vetreg_cache::{CacheChain, CachePool, CacheStore, CachedResponse, StrategyExecutor};
use vetreg_core::{Fetch, FetchError, Request, Response, WorkerConfig, WorkerPhase};
use vetreg_queue::{QueueStore, ReplayEngine, RetryPolicy, SweepReport};

use crate::messages::{ClientNotification, ControlMessage};
use crate::notifier::{BroadcastNotifier, NotifyingObserver};
use crate::router::{RequestRouter, RouteDecision};

/// Sync tag that triggers a replay sweep.
const FORM_SYNC_TAG: &str = "form-submission";

/// Fallback page served to navigations with no cache and no network.
const OFFLINE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title>Offline - VetReg</title>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
</head>
<body>
  <main>
    <h1>You're offline</h1>
    <p>Please check your internet connection and try again. Any forms you
    submit will be saved and sent when your connection is restored.</p>
  </main>
</body>
</html>"#;

/// The offline worker.
///
/// One instance per storage partition; every lifecycle handler runs to
/// completion and degrades on failure rather than surfacing an uncaught
/// error.
pub struct Worker {
    config: WorkerConfig,
    pool: Arc<dyn CachePool>,
    statics: Arc<dyn CacheStore>,
    executor: StrategyExecutor,
    router: RequestRouter,
    queue: Arc<ReplayEngine>,
    fetch: Arc<dyn Fetch>,
    notifier: Arc<BroadcastNotifier>,
}

impl Worker {
    /// Open cache partitions and assemble the worker with the default retry
    /// policy.
    pub async fn start(
        config: WorkerConfig,
        pool: Arc<dyn CachePool>,
        queue_store: Arc<dyn QueueStore>,
        fetch: Arc<dyn Fetch>,
    ) -> anyhow::Result<Self> {
        Self::start_with_policy(config, pool, queue_store, fetch, RetryPolicy::default()).await
    }

    /// Open cache partitions and assemble the worker.
    pub async fn start_with_policy(
        config: WorkerConfig,
        pool: Arc<dyn CachePool>,
        queue_store: Arc<dyn QueueStore>,
        fetch: Arc<dyn Fetch>,
        policy: RetryPolicy,
    ) -> anyhow::Result<Self> {
        let runtime = pool.open(&config.runtime_cache).await?;
        let statics = pool.open(&config.static_cache).await?;

        let notifier = Arc::new(BroadcastNotifier::default());
        let observer = Arc::new(NotifyingObserver::new(notifier.clone()));
        let queue = Arc::new(
            ReplayEngine::new(queue_store, fetch.clone())
                .with_policy(policy)
                .with_observer(observer),
        );

        let lookup = CacheChain::new(vec![runtime.clone(), statics.clone()]);
        let executor = StrategyExecutor::new(lookup, runtime, fetch.clone());

        Ok(Self {
            config,
            pool,
            statics,
            executor,
            router: RequestRouter::default(),
            queue,
            fetch,
            notifier,
        })
    }

    /// Attach a page client to the notification stream.
    pub fn notifications(&self) -> broadcast::Receiver<ClientNotification> {
        self.notifier.subscribe()
    }

    /// The replay engine (for direct queue inspection).
    pub fn queue(&self) -> &ReplayEngine {
        &self.queue
    }

    /// Install: precache the configured URLs into the static partition.
    ///
    /// Individual precache failures are logged and skipped; install itself
    /// never fails on them.
    pub async fn install(&self) -> anyhow::Result<()> {
        info!(phase = WorkerPhase::Install.as_str(), "worker installing");

        let fetches = self.config.precache_urls.iter().map(|url| {
            let resolved = self.config.resolve_url(url);
            let fetch = self.fetch.clone();
            async move {
                let request = Request::get(resolved.clone());
                (resolved, fetch.send(&request).await)
            }
        });

        for (url, result) in join_all(fetches).await {
            match result {
                Ok(response) if response.is_success() => {
                    let entry = CachedResponse::capture(&response);
                    if let Err(err) = self.statics.put(&url, entry).await {
                        warn!(url = %url, error = %err, "precache store failed");
                    }
                }
                Ok(response) => {
                    warn!(url = %url, status = response.status, "precache skipped");
                }
                Err(err) => {
                    warn!(url = %url, error = %err, "precache fetch failed");
                }
            }
        }
        Ok(())
    }

    /// Activate: drop cache partitions from older generations, then sweep
    /// the queue.
    pub async fn activate(&self) -> anyhow::Result<SweepReport> {
        info!(phase = WorkerPhase::Activate.as_str(), "worker activating");

        for name in self.pool.names().await? {
            if !self.config.is_current_partition(&name) {
                info!(partition = %name, "deleting stale cache partition");
                self.pool.remove(&name).await?;
            }
        }

        Ok(self.queue.sweep().await?)
    }

    /// Handle an intercepted fetch.
    ///
    /// Only bypassed (non-HTTP) requests can surface a `FetchError`; every
    /// intercepted path degrades to a response.
    pub async fn handle_fetch(&self, request: &Request) -> Result<Response, FetchError> {
        match self.router.decide(request) {
            RouteDecision::Bypass => self.fetch.send(request).await,
            RouteDecision::FormSubmission => Ok(self.handle_form(request).await),
            RouteDecision::Strategy(strategy) => {
                match self.executor.execute(strategy, request).await {
                    Ok(response) => Ok(response),
                    Err(err) => Ok(self.offline_fallback(request, err).await),
                }
            }
        }
    }

    /// Handle a page control message.
    pub async fn handle_message(
        &self,
        message: &ControlMessage,
    ) -> anyhow::Result<Option<SweepReport>> {
        info!(phase = WorkerPhase::Message.as_str(), ?message, "control message");
        match message {
            ControlMessage::ProcessQueue => Ok(Some(self.queue.sweep().await?)),
            ControlMessage::ClearCache => {
                for name in self.pool.names().await? {
                    self.pool.remove(&name).await?;
                }
                Ok(None)
            }
        }
    }

    /// Handle a connectivity sync event.
    pub async fn handle_sync(&self, tag: &str) -> anyhow::Result<Option<SweepReport>> {
        info!(phase = WorkerPhase::Sync(tag.to_string()).as_str(), tag, "sync event");
        if tag == FORM_SYNC_TAG {
            Ok(Some(self.queue.sweep().await?))
        } else {
            Ok(None)
        }
    }

    /// Run a replay sweep directly.
    pub async fn process_queue(&self) -> anyhow::Result<SweepReport> {
        Ok(self.queue.sweep().await?)
    }

    /// Form submission path: try the network, queue on any failure.
    ///
    /// The caller always gets a response: the real one on success, the
    /// accepted receipt when queued, or a 503 if even queueing failed.
    async fn handle_form(&self, request: &Request) -> Response {
        match self.fetch.send(request).await {
            Ok(response) if response.is_success() => response,
            outcome => {
                if let Err(err) = &outcome {
                    warn!(url = %request.url, error = %err, "form submission failed, queueing");
                }
                match self.queue.enqueue(request).await {
                    Ok((_, accepted)) => accepted,
                    Err(err) => {
                        warn!(url = %request.url, error = %err, "failed to queue form submission");
                        Response::json(
                            503,
                            &json!({
                                "error": "Failed to save form offline",
                                "message": "Please try again when connection is restored",
                            }),
                        )
                    }
                }
            }
        }
    }

    /// Last resort when a strategy failed: any cached copy, the offline page
    /// for navigations, or a 503.
    async fn offline_fallback(&self, request: &Request, err: FetchError) -> Response {
        warn!(url = %request.url, error = %err, "request handling failed");

        if let Ok(Some(entry)) = self.executor_lookup(request).await {
            return entry.response;
        }

        if request.navigation {
            let offline_url = self.config.resolve_url("/offline.html");
            if let Ok(Some(entry)) = self.statics.get(&offline_url).await {
                return entry.response;
            }
            return Response::html(200, OFFLINE_PAGE);
        }

        Response::new(503)
            .with_header("content-type", "text/plain")
            .with_body(b"Network error - content unavailable offline".to_vec())
    }

    async fn executor_lookup(
        &self,
        request: &Request,
    ) -> Result<Option<CachedResponse>, vetreg_cache::CacheError> {
        CacheChain::new(vec![
            self.pool.open(&self.config.runtime_cache).await?,
            self.statics.clone(),
        ])
        .get(&request.url)
        .await
    }
}
