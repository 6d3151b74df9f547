//! Captured response model.

use serde::{Deserialize, Serialize};

use crate::request::Headers;

/// A captured HTTP response (status, headers, body).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers (lowercase keys).
    pub headers: Headers,
    /// Raw body payload.
    pub body: Vec<u8>,
}

impl Response {
    /// Create a new response with no headers or body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Set a header (key stored lowercase).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_lowercase(), value.into());
        self
    }

    /// Set the body payload.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Build a JSON response from a serializable value.
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_default();
        Self::new(status)
            .with_header("content-type", "application/json")
            .with_body(body)
    }

    /// Build an HTML response.
    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self::new(status)
            .with_header("content-type", "text/html")
            .with_body(body.into().into_bytes())
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|s| s.as_str())
    }

    /// Interpret the body as UTF-8 text (lossy).
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        assert!(Response::new(200).is_success());
        assert!(Response::new(202).is_success());
        assert!(Response::new(299).is_success());
        assert!(!Response::new(304).is_success());
        assert!(!Response::new(404).is_success());
        assert!(!Response::new(503).is_success());
    }

    #[test]
    fn test_json_builder() {
        let resp = Response::json(202, &serde_json::json!({"success": true}));
        assert_eq!(resp.status, 202);
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert!(resp.body_text().contains("\"success\":true"));
    }
}
