use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ServiceFault;

const DEFAULT_BASE_WAIT_MS: u64 = 200;
const DEFAULT_MAX_WAIT_MS: u64 = 10_000;
const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Backoff policy applied to retryable calls against the query service.
///
/// Purely computational: callers own the actual suspension and the attempt
/// counter, which lives only for the duration of one outer operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryPolicy {
    base_wait_ms: u64,
    max_wait_ms: u64,
    max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(base_wait_ms: u64, max_wait_ms: u64, max_attempts: u32) -> Self {
        Self {
            base_wait_ms,
            max_wait_ms,
            max_attempts,
        }
    }

    pub fn base_wait_ms(&self) -> u64 {
        self.base_wait_ms
    }

    pub fn max_wait_ms(&self) -> u64 {
        self.max_wait_ms
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether a failed attempt should be retried.
    ///
    /// Only transient faults qualify, and retries stop exactly at
    /// `attempt == max_attempts`.
    pub fn should_retry(&self, fault: &ServiceFault, attempt: u32) -> bool {
        attempt < self.max_attempts && fault.is_transient()
    }

    /// Wait before the retry that follows failed attempt `attempt`.
    ///
    /// Doubling schedule capped at `max_wait_ms`. The same schedule applies
    /// to every retryable operation, stop-query calls included.
    pub fn wait_for_attempt(&self, attempt: u32) -> Duration {
        let shift = attempt.min(20);
        let multiplier = 1_u64 << shift;
        let calculated = self.base_wait_ms.saturating_mul(multiplier);
        Duration::from_millis(calculated.min(self.max_wait_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_WAIT_MS, DEFAULT_MAX_WAIT_MS, DEFAULT_MAX_ATTEMPTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FaultCategory, ServiceFault};

    #[test]
    fn starts_with_base_wait() {
        let policy = RetryPolicy::new(200, 10_000, 10);
        assert_eq!(policy.wait_for_attempt(0), Duration::from_millis(200));
    }

    #[test]
    fn scales_exponentially_for_attempts() {
        let policy = RetryPolicy::new(200, 10_000, 10);
        assert_eq!(policy.wait_for_attempt(5), Duration::from_millis(6_400));
    }

    #[test]
    fn caps_wait_at_max() {
        let policy = RetryPolicy::new(200, 10_000, 10);
        assert_eq!(policy.wait_for_attempt(10), Duration::from_millis(10_000));
    }

    #[test]
    fn wait_is_monotonically_non_decreasing() {
        let policy = RetryPolicy::default();
        let mut last = Duration::ZERO;
        for attempt in 0..40 {
            let wait = policy.wait_for_attempt(attempt);
            assert!(wait >= last, "attempt {attempt} decreased the wait");
            assert!(wait <= Duration::from_millis(policy.max_wait_ms()));
            last = wait;
        }
    }

    #[test]
    fn retries_transient_faults_below_attempt_bound() {
        let policy = RetryPolicy::new(200, 10_000, 3);
        let fault = ServiceFault::throttled("slow down");
        assert!(policy.should_retry(&fault, 0));
        assert!(policy.should_retry(&fault, 2));
    }

    #[test]
    fn stops_retrying_exactly_at_max_attempts() {
        let policy = RetryPolicy::new(200, 10_000, 3);
        let fault = ServiceFault::throttled("slow down");
        assert!(!policy.should_retry(&fault, 3));
        assert!(!policy.should_retry(&fault, 4));
    }

    #[test]
    fn never_retries_non_transient_faults() {
        let policy = RetryPolicy::default();
        let fault = ServiceFault::new(FaultCategory::InvalidRequest, "InvalidRequestException", "bad");
        assert!(!policy.should_retry(&fault, 0));
    }

    #[test]
    fn defaults_match_documented_tuning() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.base_wait_ms(), 200);
        assert_eq!(policy.max_wait_ms(), 10_000);
        assert_eq!(policy.max_attempts(), 10);
    }
}
