//! 弹性模块：令牌桶限流。
//!
//! # Resilience
//!
//! Admission control for outbound requests. Every call on a client acquires
//! one token from the client's [`RateLimiter`] before the first attempt;
//! retries of the same call do not take another token.
//!
//! ```rust
//! use ollama_lib_rust::resilience::{RateLimiter, RateLimiterConfig};
//!
//! let config = RateLimiterConfig::from_rps(10.0).unwrap();
//! assert_eq!(config.burst, 10.0);
//! let _limiter = RateLimiter::new(config);
//!
//! assert!(RateLimiterConfig::from_rps(0.0).is_err());
//! ```

pub mod rate_limiter;

pub use rate_limiter::{RateLimiter, RateLimiterConfig, RateLimiterSnapshot};
