//! Intercepted request model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// HTTP headers as a sorted key/value mapping.
///
/// Keys are stored lowercase so lookups are case-insensitive and the
/// serialized form is deterministic.
pub type Headers = BTreeMap<String, String>;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    /// Get the method as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }

    /// Parse from a wire string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "DELETE" => Some(Method::Delete),
            "PATCH" => Some(Method::Patch),
            "HEAD" => Some(Method::Head),
            "OPTIONS" => Some(Method::Options),
            _ => None,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An intercepted outgoing request.
#[derive(Debug, Clone)]
pub struct Request {
    /// Full request URL.
    pub url: String,
    /// HTTP method.
    pub method: Method,
    /// Request headers (lowercase keys).
    pub headers: Headers,
    /// Raw body payload.
    pub body: String,
    /// Whether this is a page navigation request.
    pub navigation: bool,
}

impl Request {
    /// Create a new request with no headers or body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Headers::new(),
            body: String::new(),
            navigation: false,
        }
    }

    /// Shorthand for a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// Shorthand for a POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    /// Set a header (key stored lowercase).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_lowercase(), value.into());
        self
    }

    /// Set the body payload.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Mark this request as a page navigation.
    pub fn navigate(mut self) -> Self {
        self.navigation = true;
        self
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|s| s.as_str())
    }

    /// Get the URL scheme (the part before `://`), if any.
    pub fn scheme(&self) -> Option<&str> {
        self.url.split_once("://").map(|(scheme, _)| scheme)
    }

    /// Whether the request uses an HTTP scheme.
    pub fn is_http(&self) -> bool {
        matches!(self.scheme(), Some("http") | Some("https"))
    }

    /// Get the URL path component (no scheme/host/query).
    pub fn path(&self) -> &str {
        let after_scheme = match self.url.split_once("://") {
            Some((_, rest)) => rest,
            None => return self.url.as_str(),
        };
        let path = match after_scheme.find('/') {
            Some(i) => &after_scheme[i..],
            None => "/",
        };
        match path.split_once(['?', '#']) {
            Some((p, _)) => p,
            None => path,
        }
    }

    /// Get the content type header, if present.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_roundtrip() {
        assert_eq!(Method::parse("post"), Some(Method::Post));
        assert_eq!(Method::Post.as_str(), "POST");
        assert_eq!(Method::parse("TRACE"), None);
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let req = Request::post("https://vetreg.example/signup")
            .with_header("Content-Type", "application/json");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn test_path_extraction() {
        let req = Request::get("https://vetreg.example/profile?tab=prefs#top");
        assert_eq!(req.path(), "/profile");

        let root = Request::get("https://vetreg.example");
        assert_eq!(root.path(), "/");

        let asset = Request::get("https://cdn.example/assets/app.js");
        assert_eq!(asset.path(), "/assets/app.js");
    }

    #[test]
    fn test_scheme_detection() {
        assert!(Request::get("https://vetreg.example/").is_http());
        assert!(Request::get("http://vetreg.example/").is_http());
        assert!(!Request::get("chrome-extension://abcdef/page.html").is_http());
        assert!(!Request::get("data:text/plain,hello").is_http());
    }
}
