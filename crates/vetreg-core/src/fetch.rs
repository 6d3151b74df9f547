//! Outbound network interface.

use async_trait::async_trait;

use crate::request::Request;
use crate::response::Response;

/// Error type for fetch operations.
///
/// A `FetchError` means the request never produced a response; a non-2xx
/// response is `Ok` and classified by the caller.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Request error: {0}")]
    Request(String),
}

/// Outbound fetch interface.
///
/// Implemented by the real HTTP client and by scripted fakes in tests.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Send a request over the network.
    async fn send(&self, request: &Request) -> Result<Response, FetchError>;
}
