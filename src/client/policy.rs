use crate::Error;
use std::time::Duration;

/// How the dispatcher proceeds after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Retry { delay: Duration },
    Fail,
}

/// Where a received status code sends the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusClass {
    /// 200: hand the open body to the caller.
    Success,
    /// 429 or 5xx: drop the body and try again.
    Retryable,
    /// Anything else: stop retrying and classify as an error.
    Final,
}

pub(crate) fn classify_status(status: u16) -> StatusClass {
    match status {
        200 => StatusClass::Success,
        429 | 500..=599 => StatusClass::Retryable,
        _ => StatusClass::Final,
    }
}

/// Bounded retry with capped exponential backoff.
///
/// Attempts run `0..=max_retries`, so a call makes at most `max_retries + 1`
/// exchanges. Retry `n` (1-based) waits `min(base_wait * 2^(n-1), max_wait)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_wait: Duration,
    pub max_wait: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_wait: Duration, max_wait: Duration) -> Self {
        Self {
            max_retries,
            base_wait,
            max_wait: max_wait.max(base_wait),
        }
    }

    /// Total attempts including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based). Zero for `retry == 0`.
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(retry - 1).unwrap_or(u32::MAX);
        self.base_wait
            .checked_mul(factor)
            .unwrap_or(self.max_wait)
            .min(self.max_wait)
    }

    /// Decide what to do after 0-based `attempt` failed with `err`.
    pub(crate) fn decide(&self, err: &Error, attempt: u32) -> Decision {
        if err.is_retryable() && attempt < self.max_retries {
            Decision::Retry {
                delay: self.backoff_delay(attempt + 1),
            }
        } else {
            Decision::Fail
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(30))
    }
}
