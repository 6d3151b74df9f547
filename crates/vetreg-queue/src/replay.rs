//! Enqueue and replay of failed submissions.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use vetreg_core::{Fetch, Request, Response};

use crate::record::{QueuedSubmission, SubmissionId, SubmissionStatus};
use crate::retry::RetryPolicy;
use crate::store::{QueueResult, QueueStore};

/// Observer for queue lifecycle events; fire-and-forget.
pub trait ReplayObserver: Send + Sync {
    /// A submission was enqueued.
    fn on_queued(&self, record: &QueuedSubmission) {
        let _ = record;
    }

    /// A queued submission was replayed successfully.
    fn on_submitted(&self, id: &SubmissionId) {
        let _ = id;
    }
}

/// Body of the accepted response returned to a caller whose submission was
/// queued. The caller sees a deferred success, not a failure.
#[derive(Debug, Serialize)]
pub struct QueuedReceipt {
    pub success: bool,
    pub message: String,
    #[serde(rename = "queueId")]
    pub queue_id: SubmissionId,
}

/// Outcome of one replay sweep.
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Records replayed successfully and removed.
    pub completed: Vec<SubmissionId>,
    /// Records that failed and remain eligible.
    pub retried: Vec<SubmissionId>,
    /// Records that reached the ceiling during this sweep.
    pub abandoned: Vec<SubmissionId>,
    /// Records skipped because they were already abandoned.
    pub skipped: usize,
}

impl SweepReport {
    /// Whether the sweep touched nothing.
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
            && self.retried.is_empty()
            && self.abandoned.is_empty()
            && self.skipped == 0
    }
}

/// Replays queued submissions with a bounded retry ceiling.
///
/// Sweeps are mutually exclusive: a sweep requested while another is running
/// waits for it to finish, so the per-record read-modify-write can never
/// interleave and over-increment past the ceiling.
pub struct ReplayEngine {
    store: Arc<dyn QueueStore>,
    fetch: Arc<dyn Fetch>,
    policy: RetryPolicy,
    observer: Option<Arc<dyn ReplayObserver>>,
    sweep_lock: Mutex<()>,
}

impl ReplayEngine {
    /// Create an engine with the default retry policy.
    pub fn new(store: Arc<dyn QueueStore>, fetch: Arc<dyn Fetch>) -> Self {
        Self {
            store,
            fetch,
            policy: RetryPolicy::default(),
            observer: None,
            sweep_lock: Mutex::new(()),
        }
    }

    /// Set the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attach a lifecycle observer.
    pub fn with_observer(mut self, observer: Arc<dyn ReplayObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The engine's retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Persist a failed submission and build the accepted response for the
    /// caller.
    pub async fn enqueue(&self, request: &Request) -> QueueResult<(SubmissionId, Response)> {
        let record = QueuedSubmission::capture(request);
        let id = record.id.clone();
        self.store.put(record.clone()).await?;

        info!(id = %id, url = %record.url, "form submission queued");
        if let Some(observer) = &self.observer {
            observer.on_queued(&record);
        }

        let receipt = QueuedReceipt {
            success: true,
            message: "Form saved offline. Will submit when connection is restored.".to_string(),
            queue_id: id.clone(),
        };
        Ok((id, Response::json(202, &receipt)))
    }

    /// Replay every eligible record once.
    ///
    /// Successful replays are deleted and reported to the observer; failures
    /// increment the retry count and rewrite the record. Abandoned records
    /// are skipped. Per-record failures never abort the sweep.
    pub async fn sweep(&self) -> QueueResult<SweepReport> {
        let _guard = self.sweep_lock.lock().await;

        let records = self.store.list().await?;
        let mut report = SweepReport::default();

        for mut record in records {
            match record.status(&self.policy) {
                SubmissionStatus::Abandoned => {
                    debug!(id = %record.id, "skipping abandoned submission");
                    report.skipped += 1;
                    continue;
                }
                SubmissionStatus::Retrying => {
                    let delay = self.policy.backoff.delay_for_attempt(record.retry_count - 1);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                SubmissionStatus::Pending => {}
            }

            let request = record.to_request();
            let succeeded = matches!(
                self.fetch.send(&request).await,
                Ok(response) if response.is_success()
            );

            if succeeded {
                if let Err(err) = self.store.delete(&record.id).await {
                    warn!(id = %record.id, error = %err, "failed to remove replayed submission");
                    continue;
                }
                info!(id = %record.id, "queued submission replayed");
                if let Some(observer) = &self.observer {
                    observer.on_submitted(&record.id);
                }
                report.completed.push(record.id);
            } else {
                record.retry_count += 1;
                let abandoned = !self.policy.should_retry(record.retry_count);
                if let Err(err) = self.store.put(record.clone()).await {
                    warn!(id = %record.id, error = %err, "failed to rewrite submission");
                    continue;
                }
                if abandoned {
                    warn!(id = %record.id, retries = record.retry_count, "submission abandoned");
                    report.abandoned.push(record.id);
                } else {
                    debug!(id = %record.id, retries = record.retry_count, "replay failed");
                    report.retried.push(record.id);
                }
            }
        }

        if !report.is_empty() {
            info!(
                completed = report.completed.len(),
                retried = report.retried.len(),
                abandoned = report.abandoned.len(),
                skipped = report.skipped,
                "replay sweep finished"
            );
        }
        Ok(report)
    }

    /// Delete abandoned records; returns how many were removed.
    pub async fn purge_abandoned(&self) -> QueueResult<usize> {
        let _guard = self.sweep_lock.lock().await;

        let records = self.store.list().await?;
        let mut removed = 0;
        for record in records {
            if record.status(&self.policy) == SubmissionStatus::Abandoned
                && self.store.delete(&record.id).await?
            {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use vetreg_core::FetchError;

    use super::*;
    use crate::store::MemoryQueueStore;

    /// Fetch fake that fails until flipped online.
    struct FlakyFetch {
        online: AtomicBool,
        calls: AtomicUsize,
    }

    impl FlakyFetch {
        fn offline() -> Self {
            Self {
                online: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            }
        }

        fn go_online(&self) {
            self.online.store(true, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetch for FlakyFetch {
        async fn send(&self, _request: &Request) -> Result<Response, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.online.load(Ordering::SeqCst) {
                Ok(Response::new(200))
            } else {
                Err(FetchError::Connection("offline".into()))
            }
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        queued: std::sync::Mutex<Vec<SubmissionId>>,
        submitted: std::sync::Mutex<Vec<SubmissionId>>,
    }

    impl ReplayObserver for RecordingObserver {
        fn on_queued(&self, record: &QueuedSubmission) {
            self.queued.lock().unwrap().push(record.id.clone());
        }

        fn on_submitted(&self, id: &SubmissionId) {
            self.submitted.lock().unwrap().push(id.clone());
        }
    }

    fn signup_request() -> Request {
        Request::post("https://vetreg.example/signup")
            .with_header("content-type", "application/json")
            .with_body(r#"{"email":"a@b.com","password":"Str0ng!Pass12"}"#)
    }

    fn engine(
        fetch: Arc<FlakyFetch>,
    ) -> (ReplayEngine, Arc<MemoryQueueStore>, Arc<RecordingObserver>) {
        let store = Arc::new(MemoryQueueStore::new());
        let observer = Arc::new(RecordingObserver::default());
        let engine =
            ReplayEngine::new(store.clone(), fetch).with_observer(observer.clone());
        (engine, store, observer)
    }

    #[tokio::test]
    async fn test_enqueue_returns_accepted_response() {
        let fetch = Arc::new(FlakyFetch::offline());
        let (engine, store, observer) = engine(fetch);

        let (id, response) = engine.enqueue(&signup_request()).await.unwrap();
        assert_eq!(response.status, 202);

        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["queueId"], id.as_str());

        assert_eq!(store.list().await.unwrap().len(), 1);
        assert_eq!(observer.queued.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_success_removes_and_notifies_once() {
        let fetch = Arc::new(FlakyFetch::offline());
        let (engine, store, observer) = engine(fetch.clone());

        let (id, _) = engine.enqueue(&signup_request()).await.unwrap();
        fetch.go_online();

        let report = engine.sweep().await.unwrap();
        assert_eq!(report.completed, vec![id.clone()]);
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(observer.submitted.lock().unwrap().as_slice(), &[id]);

        // A second sweep finds nothing to do.
        let report = engine.sweep().await.unwrap();
        assert!(report.is_empty());
        assert_eq!(observer.submitted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_failures_increment_then_abandon() {
        let fetch = Arc::new(FlakyFetch::offline());
        let (engine, store, _observer) = engine(fetch.clone());

        let (id, _) = engine.enqueue(&signup_request()).await.unwrap();

        for expected in 1..=2u32 {
            let report = engine.sweep().await.unwrap();
            assert_eq!(report.retried, vec![id.clone()]);
            assert_eq!(
                store.get(&id).await.unwrap().unwrap().retry_count,
                expected
            );
        }

        // Third failure hits the ceiling.
        let report = engine.sweep().await.unwrap();
        assert_eq!(report.abandoned, vec![id.clone()]);
        assert_eq!(store.get(&id).await.unwrap().unwrap().retry_count, 3);

        // Abandoned records persist but are no longer attempted.
        let calls_before = fetch.calls();
        let report = engine.sweep().await.unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(fetch.calls(), calls_before);
        assert!(store.get(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_abandoned_record_replays_after_purge_reenqueue() {
        let fetch = Arc::new(FlakyFetch::offline());
        let (engine, store, _observer) = engine(fetch.clone());

        engine.enqueue(&signup_request()).await.unwrap();
        for _ in 0..3 {
            engine.sweep().await.unwrap();
        }
        assert_eq!(engine.purge_abandoned().await.unwrap(), 1);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_sweeps_are_serialized() {
        let fetch = Arc::new(FlakyFetch::offline());
        let store = Arc::new(MemoryQueueStore::new());
        let engine = Arc::new(ReplayEngine::new(store.clone(), fetch));

        let (id, _) = engine.enqueue(&signup_request()).await.unwrap();

        let a = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.sweep().await })
        };
        let b = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.sweep().await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        // Two serialized sweeps: exactly one increment each, never a lost or
        // doubled write.
        assert_eq!(store.get(&id).await.unwrap().unwrap().retry_count, 2);
    }
}
