//! Replay retry policy.

use std::time::Duration;

/// Backoff strategy between replay attempts of a record.
#[derive(Debug, Clone)]
pub enum BackoffStrategy {
    /// No delay between attempts.
    None,
    /// Fixed delay between attempts.
    Fixed(Duration),
    /// Exponential backoff with base and max.
    Exponential {
        /// Initial delay.
        base: Duration,
        /// Maximum delay.
        max: Duration,
    },
}

impl BackoffStrategy {
    /// Calculate the delay before a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed(d) => *d,
            Self::Exponential { base, max } => {
                let multiplier = 2u64.saturating_pow(attempt);
                let delay =
                    Duration::from_millis((base.as_millis() as u64).saturating_mul(multiplier));
                std::cmp::min(delay, *max)
            }
        }
    }
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self::None
    }
}

/// Replay policy: how many times a record may fail before abandonment, and
/// how long to wait between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Records with `retry_count >= ceiling` are abandoned.
    pub ceiling: u32,
    /// Backoff between attempts.
    pub backoff: BackoffStrategy,
}

impl RetryPolicy {
    /// Create a policy with the given ceiling and no backoff.
    pub fn new(ceiling: u32) -> Self {
        Self {
            ceiling,
            backoff: BackoffStrategy::None,
        }
    }

    /// Set the backoff strategy.
    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Whether a record with this many failed attempts is still eligible.
    pub fn should_retry(&self, retry_count: u32) -> bool {
        retry_count < self.ceiling
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ceiling_is_three() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(0));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
        assert!(!policy.should_retry(10));
    }

    #[test]
    fn test_default_has_no_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff.delay_for_attempt(2), Duration::ZERO);
    }

    #[test]
    fn test_exponential_backoff_caps_at_max() {
        let backoff = BackoffStrategy::Exponential {
            base: Duration::from_millis(100),
            max: Duration::from_millis(500),
        };
        assert_eq!(backoff.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(backoff.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(backoff.delay_for_attempt(3), Duration::from_millis(500));
    }
}
