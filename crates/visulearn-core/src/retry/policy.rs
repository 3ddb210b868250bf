//! Retry policy for external calls.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);

/// Backoff multiplier between consecutive retries.
pub const BACKOFF_MULTIPLIER: u32 = 2;

/// Bounded exponential backoff.
///
/// A call runs at most `max_retries + 1` times. The wait before retry `i`
/// (0-indexed) is `base_delay * 2^i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retries.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: DEFAULT_MAX_RETRIES, base_delay: DEFAULT_BASE_DELAY }
    }
}

impl RetryPolicy {
    /// Create a new retry policy.
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self { max_retries, base_delay }
    }

    /// A policy that never retries.
    pub const fn no_retry() -> Self {
        Self { max_retries: 0, base_delay: Duration::ZERO }
    }

    /// Total number of attempts this policy allows.
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Calculate the delay before a given retry (0-indexed).
    ///
    /// Saturates instead of overflowing for absurd retry counts.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        BACKOFF_MULTIPLIER
            .checked_pow(retry)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }

    /// All delays this policy will wait through when every attempt is rate limited.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_retries).map(|retry| self.delay_for_retry(retry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(2));
        assert_eq!(policy.max_attempts(), 4);
    }

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_retry(0), Duration::from_millis(2000));
        assert_eq!(policy.delay_for_retry(1), Duration::from_millis(4000));
        assert_eq!(policy.delay_for_retry(2), Duration::from_millis(8000));
        assert_eq!(
            policy.delays().collect::<Vec<_>>(),
            vec![Duration::from_secs(2), Duration::from_secs(4), Duration::from_secs(8)]
        );
    }

    #[test]
    fn test_delay_saturates() {
        let policy = RetryPolicy::new(100, Duration::from_secs(1));
        assert_eq!(policy.delay_for_retry(64), Duration::MAX);
    }

    #[test]
    fn test_no_retry_policy() {
        let policy = RetryPolicy::no_retry();
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.delays().count(), 0);
    }
}
