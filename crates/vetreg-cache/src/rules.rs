//! Strategy selection rules.

use glob::Pattern;
use serde::{Deserialize, Serialize};

/// A caching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Serve from cache, fall back to network.
    CacheFirst,
    /// Serve from network, fall back to cache.
    NetworkFirst,
    /// Serve stale from cache, revalidate in the background.
    StaleWhileRevalidate,
}

impl Strategy {
    /// Get the strategy as its configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::CacheFirst => "cache-first",
            Strategy::NetworkFirst => "network-first",
            Strategy::StaleWhileRevalidate => "stale-while-revalidate",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One pattern group mapped to a strategy.
#[derive(Debug, Clone)]
struct StrategyRule {
    patterns: Vec<Pattern>,
    strategy: Strategy,
}

/// Ordered pattern-to-strategy rules, evaluated first-match-wins against the
/// request path. Paths matching nothing fall through to the default strategy;
/// that is the expected case for pages, not an error.
#[derive(Debug, Clone)]
pub struct StrategyRules {
    rules: Vec<StrategyRule>,
    default: Strategy,
}

impl StrategyRules {
    /// Create an empty rule set with the given default strategy.
    pub fn new(default: Strategy) -> Self {
        Self {
            rules: Vec::new(),
            default,
        }
    }

    /// Append a rule group (glob patterns) for a strategy.
    pub fn with_rule(
        mut self,
        strategy: Strategy,
        patterns: &[&str],
    ) -> Result<Self, glob::PatternError> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        self.rules.push(StrategyRule { patterns, strategy });
        Ok(self)
    }

    /// Select the strategy for a request path.
    pub fn select(&self, path: &str) -> Strategy {
        for rule in &self.rules {
            if rule.patterns.iter().any(|p| p.matches(path)) {
                return rule.strategy;
            }
        }
        self.default
    }

    /// The rule set used by the registration app.
    ///
    /// Static assets, icon paths, the design-system vendor bundle, and the
    /// manifest are cache-first; API/auth/signup/register paths are
    /// network-first; everything else (HTML pages, navigational routes) is
    /// stale-while-revalidate.
    pub fn registration_defaults() -> Self {
        Self::new(Strategy::StaleWhileRevalidate)
            .with_rule(
                Strategy::CacheFirst,
                &[
                    "*.js", "*.css", "*.woff", "*.woff2", "*.png", "*.jpg", "*.jpeg", "*.gif",
                    "*.svg", "*.ico", "*/icons/*", "*nordhealth*", "*manifest.json",
                ],
            )
            .expect("static patterns are valid")
            .with_rule(
                Strategy::NetworkFirst,
                &["*/api/*", "*/auth/*", "*/signup", "*/register"],
            )
            .expect("static patterns are valid")
    }
}

impl Default for StrategyRules {
    fn default() -> Self {
        Self::registration_defaults()
    }
}
