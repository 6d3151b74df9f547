//! Request routing: decide the handling path before any I/O.

use vetreg_cache::{Strategy, StrategyRules};
use vetreg_core::{Method, Request};

/// Content types treated as form submissions.
const FORM_CONTENT_TYPES: [&str; 3] = [
    "application/x-www-form-urlencoded",
    "multipart/form-data",
    "application/json",
];

/// How an intercepted request should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Non-HTTP scheme; pass through untouched.
    Bypass,
    /// Form POST; network attempt with offline queueing.
    FormSubmission,
    /// Everything else; run the selected caching strategy.
    Strategy(Strategy),
}

/// Stateless dispatcher over the strategy rules.
pub struct RequestRouter {
    rules: StrategyRules,
}

impl RequestRouter {
    /// Create a router over a rule set.
    pub fn new(rules: StrategyRules) -> Self {
        Self { rules }
    }

    /// Decide the handling path for a request.
    pub fn decide(&self, request: &Request) -> RouteDecision {
        if !request.is_http() {
            return RouteDecision::Bypass;
        }
        if is_form_submission(request) {
            return RouteDecision::FormSubmission;
        }
        RouteDecision::Strategy(self.rules.select(request.path()))
    }
}

impl Default for RequestRouter {
    fn default() -> Self {
        Self::new(StrategyRules::registration_defaults())
    }
}

/// Whether a request is a form submission: a POST whose content type is
/// form-urlencoded, multipart, or JSON.
pub fn is_form_submission(request: &Request) -> bool {
    if request.method != Method::Post {
        return false;
    }
    let content_type = request.content_type().unwrap_or("");
    FORM_CONTENT_TYPES.iter().any(|ct| content_type.contains(ct))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_http_schemes_bypass() {
        let router = RequestRouter::default();
        for url in [
            "chrome-extension://abcdef/popup.html",
            "data:text/plain,hello",
            "blob:https://vetreg.example/123",
        ] {
            assert_eq!(router.decide(&Request::get(url)), RouteDecision::Bypass);
        }
    }

    #[test]
    fn test_form_posts_route_to_queue_path() {
        let router = RequestRouter::default();
        for content_type in [
            "application/x-www-form-urlencoded",
            "multipart/form-data; boundary=x",
            "application/json; charset=utf-8",
        ] {
            let request = Request::post("https://vetreg.example/signup")
                .with_header("content-type", content_type);
            assert_eq!(router.decide(&request), RouteDecision::FormSubmission);
        }
    }

    #[test]
    fn test_non_form_posts_use_strategies() {
        let router = RequestRouter::default();
        let request = Request::post("https://vetreg.example/signup")
            .with_header("content-type", "text/plain");
        assert_eq!(
            router.decide(&request),
            RouteDecision::Strategy(Strategy::NetworkFirst)
        );

        let no_content_type = Request::post("https://vetreg.example/api/ping");
        assert_eq!(
            router.decide(&no_content_type),
            RouteDecision::Strategy(Strategy::NetworkFirst)
        );
    }

    #[test]
    fn test_gets_never_route_to_queue_path() {
        let router = RequestRouter::default();
        let request = Request::get("https://vetreg.example/signup")
            .with_header("content-type", "application/json");
        assert_eq!(
            router.decide(&request),
            RouteDecision::Strategy(Strategy::NetworkFirst)
        );
    }

    #[test]
    fn test_strategy_dispatch_by_path() {
        let router = RequestRouter::default();
        assert_eq!(
            router.decide(&Request::get("https://vetreg.example/assets/app.js")),
            RouteDecision::Strategy(Strategy::CacheFirst)
        );
        assert_eq!(
            router.decide(&Request::get("https://vetreg.example/profile")),
            RouteDecision::Strategy(Strategy::StaleWhileRevalidate)
        );
    }
}
