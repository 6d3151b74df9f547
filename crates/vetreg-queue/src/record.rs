//! Queued submission records.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};
use vetreg_core::{Headers, Request};

use crate::retry::RetryPolicy;

/// Unique identifier for a queued submission, derived from the enqueue time
/// plus a random suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(String);

impl SubmissionId {
    /// Generate a fresh id.
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let suffix: String = rand::thread_rng()
            .sample_iter(rand::distributions::Alphanumeric)
            .take(9)
            .map(|b| (b as char).to_ascii_lowercase())
            .collect();
        Self(format!("form_{}_{}", millis, suffix))
    }

    /// Create from an existing id string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derived lifecycle state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// Waiting for the next replay sweep.
    Pending,
    /// At least one replay failed; still eligible.
    Retrying,
    /// Retry ceiling reached; kept in the store but skipped by sweeps.
    Abandoned,
}

/// A form submission persisted for later replay.
///
/// Field names serialize in the wire form the page-side tooling reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedSubmission {
    /// Unique id (time + random derived).
    pub id: SubmissionId,
    /// Target URL, replayed verbatim.
    pub url: String,
    /// HTTP method, replayed verbatim.
    pub method: String,
    /// Serialized request headers.
    pub headers: Headers,
    /// Raw body payload.
    pub body: String,
    /// Unix timestamp (milliseconds) at enqueue.
    pub timestamp: i64,
    /// Failed replay attempts so far.
    pub retry_count: u32,
}

impl QueuedSubmission {
    /// Capture a failed request as a queue record.
    pub fn capture(request: &Request) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Self {
            id: SubmissionId::generate(),
            url: request.url.clone(),
            method: request.method.as_str().to_string(),
            headers: request.headers.clone(),
            body: request.body.clone(),
            timestamp: millis,
            retry_count: 0,
        }
    }

    /// Rebuild the original request for replay.
    pub fn to_request(&self) -> Request {
        let method = vetreg_core::Method::parse(&self.method).unwrap_or(vetreg_core::Method::Post);
        Request {
            url: self.url.clone(),
            method,
            headers: self.headers.clone(),
            body: self.body.clone(),
            navigation: false,
        }
    }

    /// Derived lifecycle state under a retry policy.
    pub fn status(&self, policy: &RetryPolicy) -> SubmissionStatus {
        if !policy.should_retry(self.retry_count) {
            SubmissionStatus::Abandoned
        } else if self.retry_count > 0 {
            SubmissionStatus::Retrying
        } else {
            SubmissionStatus::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use vetreg_core::Method;

    use super::*;

    #[test]
    fn test_id_shape_and_uniqueness() {
        let a = SubmissionId::generate();
        let b = SubmissionId::generate();
        assert!(a.as_str().starts_with("form_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_capture_and_rebuild_roundtrip() {
        let request = Request::post("https://vetreg.example/signup")
            .with_header("Content-Type", "application/json")
            .with_body(r#"{"email":"a@b.com"}"#);

        let record = QueuedSubmission::capture(&request);
        assert_eq!(record.method, "POST");
        assert_eq!(record.retry_count, 0);

        let rebuilt = record.to_request();
        assert_eq!(rebuilt.url, request.url);
        assert_eq!(rebuilt.method, Method::Post);
        assert_eq!(rebuilt.header("content-type"), Some("application/json"));
        assert_eq!(rebuilt.body, request.body);
    }

    #[test]
    fn test_wire_field_names() {
        let record = QueuedSubmission::capture(&Request::post("https://x/signup"));
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("retryCount").is_some());
        assert!(json.get("timestamp").is_some());
        assert!(json.get("retry_count").is_none());
    }

    #[test]
    fn test_status_derivation() {
        let policy = RetryPolicy::default();
        let mut record = QueuedSubmission::capture(&Request::post("https://x/signup"));
        assert_eq!(record.status(&policy), SubmissionStatus::Pending);

        record.retry_count = 1;
        assert_eq!(record.status(&policy), SubmissionStatus::Retrying);

        record.retry_count = 3;
        assert_eq!(record.status(&policy), SubmissionStatus::Abandoned);
    }
}
