use crate::client::CallContext;
use crate::error::ErrorContext;
use crate::{Error, Result};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct RateLimiterSnapshot {
    pub rps: f64,
    pub burst: f64,
    pub tokens: f64,
    /// Estimated wait time until a token is available (ms), if currently empty.
    pub estimated_wait_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateLimiterConfig {
    /// Tokens per second.
    pub rps: f64,
    /// Maximum burst size (tokens).
    pub burst: f64,
}

impl RateLimiterConfig {
    /// Steady rate `rps` with a burst of one second's worth of tokens.
    ///
    /// Zero, negative and non-finite rates are configuration errors; there is
    /// no "unlimited" setting.
    pub fn from_rps(rps: f64) -> Result<Self> {
        if !rps.is_finite() || rps <= 0.0 {
            return Err(Error::configuration_with_context(
                format!("rate limit must be a positive number of requests per second, got {rps}"),
                ErrorContext::new()
                    .with_field_path("rate_limit")
                    .with_details(rps.to_string()),
            ));
        }
        Ok(Self {
            rps,
            burst: rps.max(1.0), // fractional rates still admit one request
        })
    }

    pub fn with_burst(mut self, burst: f64) -> Self {
        self.burst = burst.max(1.0);
        self
    }
}

// refill arithmetic is floating point; a hair short of a whole token counts
const TOKEN_EPSILON: f64 = 1e-9;
// timer resolution
const MIN_WAIT: Duration = Duration::from_millis(1);

#[derive(Debug)]
struct State {
    tokens: f64,
    last: Instant,
}

/// Token-bucket admission gate shared by every call on one client.
///
/// `acquire` only delays; it never rejects. Waiters are woken in no
/// particular order, so fairness is best-effort.
#[derive(Debug)]
pub struct RateLimiter {
    cfg: RateLimiterConfig,
    state: Mutex<State>,
}

impl RateLimiter {
    pub fn new(cfg: RateLimiterConfig) -> Self {
        let state = Mutex::new(State {
            tokens: cfg.burst,
            last: Instant::now(),
        });
        Self { cfg, state }
    }

    pub fn from_rps(rps: f64) -> Result<Self> {
        RateLimiterConfig::from_rps(rps).map(Self::new)
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.cfg
    }

    fn refill_locked(cfg: &RateLimiterConfig, st: &mut State) {
        let now = Instant::now();
        let elapsed = now.duration_since(st.last).as_secs_f64();
        if elapsed > 0.0 {
            st.tokens = (st.tokens + elapsed * cfg.rps).min(cfg.burst);
            st.last = now;
        }
    }

    /// Take a token if one is available, otherwise return how long until one is.
    async fn take_or_wait(&self) -> Option<Duration> {
        let mut st = self.state.lock().await;
        Self::refill_locked(&self.cfg, &mut st);
        if st.tokens + TOKEN_EPSILON >= 1.0 {
            st.tokens -= 1.0;
            return None;
        }
        let missing = 1.0 - st.tokens;
        // vanishingly small rates overflow Duration; wait "forever" instead
        let wait = Duration::try_from_secs_f64(missing / self.cfg.rps).unwrap_or(Duration::MAX);
        Some(wait.max(MIN_WAIT))
    }

    /// Acquire one token, sleeping until one is available.
    ///
    /// Fails with [`Error::RateLimitCancelled`] if `ctx` fires first.
    pub async fn acquire(&self, ctx: &CallContext) -> Result<()> {
        loop {
            if ctx.is_cancelled() {
                return Err(Error::RateLimitCancelled);
            }
            let wait = tokio::select! {
                biased;
                _ = ctx.cancelled() => return Err(Error::RateLimitCancelled),
                wait = self.take_or_wait() => wait,
            };
            let Some(wait) = wait else {
                return Ok(());
            };
            tokio::select! {
                biased;
                _ = ctx.cancelled() => return Err(Error::RateLimitCancelled),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// Try to acquire a token without waiting, returns true if successful
    pub async fn try_acquire(&self) -> bool {
        self.take_or_wait().await.is_none()
    }

    pub async fn snapshot(&self) -> RateLimiterSnapshot {
        let cfg = &self.cfg;
        let mut st = self.state.lock().await;
        Self::refill_locked(cfg, &mut st);

        let estimated_wait_ms = (st.tokens < 1.0).then(|| {
            let missing = 1.0 - st.tokens;
            // float to int `as` saturates at u64::MAX
            (missing / cfg.rps * 1000.0).ceil() as u64
        });

        RateLimiterSnapshot {
            rps: cfg.rps,
            burst: cfg.burst,
            tokens: st.tokens,
            estimated_wait_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_rate_limiter_config_from_rps() {
        let config = RateLimiterConfig::from_rps(10.0).unwrap();
        assert_eq!(config.rps, 10.0);
        assert_eq!(config.burst, 10.0);
    }

    #[test]
    fn test_rate_limiter_config_from_rps_low() {
        let config = RateLimiterConfig::from_rps(0.5).unwrap();
        assert_eq!(config.rps, 0.5);
        assert_eq!(config.burst, 1.0);
    }

    #[test]
    fn test_rate_limiter_config_from_rps_invalid() {
        for rps in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = RateLimiterConfig::from_rps(rps).unwrap_err();
            assert!(matches!(err, Error::Configuration { .. }), "{rps}: {err}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_initial_burst() {
        let limiter = RateLimiter::from_rps(10.0).unwrap();
        let snapshot = limiter.snapshot().await;
        assert_eq!(snapshot.burst, 10.0);
        assert_eq!(snapshot.tokens, 10.0);
        assert!(snapshot.estimated_wait_ms.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_try_acquire() {
        let limiter = RateLimiter::new(RateLimiterConfig::from_rps(1.0).unwrap().with_burst(3.0));

        assert!(limiter.try_acquire().await);
        assert!(limiter.try_acquire().await);
        assert!(limiter.try_acquire().await);
        assert!(!limiter.try_acquire().await);

        let snapshot = limiter.snapshot().await;
        assert_eq!(snapshot.estimated_wait_ms, Some(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_refill() {
        let limiter = RateLimiter::from_rps(100.0).unwrap();
        for _ in 0..100 {
            assert!(limiter.try_acquire().await);
        }
        assert!(!limiter.try_acquire().await);

        tokio::time::advance(Duration::from_millis(20)).await;
        assert!(limiter.try_acquire().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_waits_for_refill() {
        let limiter = RateLimiter::from_rps(2.0).unwrap();
        let ctx = CallContext::new();
        let start = Instant::now();
        for _ in 0..4 {
            limiter.acquire(&ctx).await.unwrap();
        }
        // two from the burst, two more at 500ms apiece
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1000), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(1100), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_observes_cancellation() {
        let limiter = Arc::new(RateLimiter::from_rps(1.0).unwrap());
        let ctx = CallContext::new().with_timeout(Duration::from_millis(100));
        limiter.acquire(&ctx).await.unwrap();

        let start = Instant::now();
        let err = limiter.acquire(&ctx).await.unwrap_err();
        assert!(matches!(err, Error::RateLimitCancelled));
        assert!(start.elapsed() <= Duration::from_millis(150));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tiny_rate_waits_without_overflow() {
        let limiter = RateLimiter::from_rps(1e-20).unwrap();
        let ctx = CallContext::new().with_timeout(Duration::from_millis(100));
        limiter.acquire(&ctx).await.unwrap();

        let err = limiter.acquire(&ctx).await.unwrap_err();
        assert!(matches!(err, Error::RateLimitCancelled));
        assert_eq!(limiter.snapshot().await.estimated_wait_ms, Some(u64::MAX));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_context_never_takes_a_token() {
        let limiter = RateLimiter::from_rps(5.0).unwrap();
        let ctx = CallContext::new();
        ctx.token().cancel();
        assert!(limiter.acquire(&ctx).await.is_err());
        assert_eq!(limiter.snapshot().await.tokens, 5.0);
    }
}
