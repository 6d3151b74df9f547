//! Real network fetch backed by reqwest.

use async_trait::async_trait;
use vetreg_core::{Fetch, FetchError, Headers, Request, Response};

/// `Fetch` implementation over a shared reqwest client.
#[derive(Default, Clone)]
pub struct HttpFetch {
    client: reqwest::Client,
}

impl HttpFetch {
    /// Create a client with default settings (platform-default timeouts).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create over an existing reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetch for HttpFetch {
    async fn send(&self, request: &Request) -> Result<Response, FetchError> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(e.to_string())
            } else if e.is_connect() {
                FetchError::Connection(e.to_string())
            } else {
                FetchError::Request(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_string(), value.to_string());
            }
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Connection(e.to_string()))?
            .to_vec();

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
