use crate::client::core::{ClientInner, OllamaClient};
use crate::client::policy::RetryPolicy;
use crate::client::CallContext;
use crate::logging::{default_logger, Logger};
use crate::resilience::{RateLimiter, RateLimiterConfig};
use crate::transport::HttpTransport;
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_WAIT: Duration = Duration::from_secs(1);
pub const DEFAULT_RETRY_MAX_WAIT: Duration = Duration::from_secs(30);
pub const DEFAULT_RATE_LIMIT: f64 = 10.0;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Immutable configuration snapshot held by a client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: Url,
    pub max_retries: u32,
    pub retry_wait_time: Duration,
    pub retry_max_wait_time: Duration,
    /// Requests per second admitted by the client's rate limiter.
    pub rate_limit: f64,
    pub timeout: Duration,
    /// Emit dispatcher debug lines (dispatch, receipt, retry notices).
    pub debug: bool,
}

impl ClientConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            self.retry_wait_time,
            self.retry_max_wait_time,
        )
    }
}

/// Builder for [`OllamaClient`].
///
/// Every option is optional; unset options take the library defaults.
///
/// ```rust
/// use ollama_lib_rust::ClientBuilder;
/// use std::time::Duration;
///
/// let client = ClientBuilder::new()
///     .base_url("http://localhost:11434")
///     .max_retries(5)
///     .retry_wait_time(Duration::from_millis(500))
///     .rate_limit(20.0)
///     .build()
///     .unwrap();
/// assert_eq!(client.config().max_retries, 5);
/// ```
pub struct ClientBuilder {
    base_url: String,
    http_client: Option<reqwest::Client>,
    max_retries: u32,
    retry_wait_time: Duration,
    retry_max_wait_time: Duration,
    rate_limit: f64,
    timeout: Duration,
    debug: bool,
    logger: Option<Arc<dyn Logger>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http_client: None,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_wait_time: DEFAULT_RETRY_WAIT,
            retry_max_wait_time: DEFAULT_RETRY_MAX_WAIT,
            rate_limit: DEFAULT_RATE_LIMIT,
            timeout: DEFAULT_TIMEOUT,
            debug: false,
            logger: None,
        }
    }

    /// Defaults overridden from the process environment.
    ///
    /// - `OLLAMA_HOST` (a bare `host:port` gets `http://`)
    /// - `OLLAMA_MAX_RETRIES`
    /// - `OLLAMA_RPS`
    /// - `OLLAMA_TIMEOUT_SECS`
    /// - `OLLAMA_DEBUG` (`1` or `true`)
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::new().env_overrides(|key| std::env::var(key).ok())
    }

    pub(crate) fn env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("OLLAMA_HOST").filter(|s| !s.trim().is_empty()) {
            let host = host.trim();
            self.base_url = if host.contains("://") {
                host.to_string()
            } else {
                format!("http://{host}")
            };
        }
        if let Some(n) = lookup("OLLAMA_MAX_RETRIES").and_then(|s| s.trim().parse::<u32>().ok()) {
            self.max_retries = n;
        }
        if let Some(rps) = lookup("OLLAMA_RPS").and_then(|s| s.trim().parse::<f64>().ok()) {
            self.rate_limit = rps;
        }
        if let Some(secs) = lookup("OLLAMA_TIMEOUT_SECS").and_then(|s| s.trim().parse::<u64>().ok())
        {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(flag) = lookup("OLLAMA_DEBUG") {
            self.debug = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true");
        }
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Custom transport. Its own timeout settings replace [`timeout`](Self::timeout).
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Backoff before the first retry; doubles on each further retry.
    pub fn retry_wait_time(mut self, wait: Duration) -> Self {
        self.retry_wait_time = wait;
        self
    }

    /// Cap on a single backoff.
    pub fn retry_max_wait_time(mut self, wait: Duration) -> Self {
        self.retry_max_wait_time = wait;
        self
    }

    /// Requests per second. Must be positive.
    pub fn rate_limit(mut self, rps: f64) -> Self {
        self.rate_limit = rps;
        self
    }

    /// Overall per-request timeout of the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn debug(mut self, enable: bool) -> Self {
        self.debug = enable;
        self
    }

    /// Inject a logger. Default forwards to `tracing`.
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    fn parse_base_url(raw: &str) -> Result<Url> {
        let url = Url::parse(raw.trim()).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base URL: {e}"),
                ErrorContext::new()
                    .with_field_path("config.base_url")
                    .with_details(raw.to_string())
                    .with_source("client_builder"),
            )
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                format!("unsupported base URL scheme '{}'", url.scheme()),
                ErrorContext::new()
                    .with_field_path("config.base_url")
                    .with_details(raw.to_string())
                    .with_source("client_builder"),
            ));
        }
        Ok(url)
    }

    /// Validate the options and build the client.
    pub fn build(self) -> Result<OllamaClient> {
        let base_url = Self::parse_base_url(&self.base_url)?;
        let limiter_cfg = RateLimiterConfig::from_rps(self.rate_limit)?;
        let retry_max_wait_time = self.retry_max_wait_time.max(self.retry_wait_time);

        let transport = match self.http_client {
            Some(client) => HttpTransport::with_client(&base_url, client),
            None => HttpTransport::new(&base_url, self.timeout)?,
        };

        let config = ClientConfig {
            base_url,
            max_retries: self.max_retries,
            retry_wait_time: self.retry_wait_time,
            retry_max_wait_time,
            rate_limit: self.rate_limit,
            timeout: self.timeout,
            debug: self.debug,
        };

        let inner = ClientInner {
            retry: config.retry_policy(),
            config,
            transport,
            logger: self.logger.unwrap_or_else(default_logger),
            limiter: RateLimiter::new(limiter_cfg),
        };
        Ok(OllamaClient::from_parts(Arc::new(inner), CallContext::new()))
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let client = ClientBuilder::new().build().unwrap();
        let cfg = client.config();
        assert_eq!(cfg.base_url.as_str(), "http://localhost:11434/");
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.retry_wait_time, Duration::from_secs(1));
        assert_eq!(cfg.retry_max_wait_time, Duration::from_secs(30));
        assert_eq!(cfg.rate_limit, 10.0);
        assert_eq!(cfg.timeout, Duration::from_secs(300));
        assert!(!cfg.debug);
    }

    #[test]
    fn test_env_overrides() {
        let builder = ClientBuilder::new().env_overrides(lookup(&[
            ("OLLAMA_HOST", "gpu-box:11434"),
            ("OLLAMA_MAX_RETRIES", "7"),
            ("OLLAMA_RPS", "2.5"),
            ("OLLAMA_TIMEOUT_SECS", "not-a-number"),
            ("OLLAMA_DEBUG", "true"),
        ]));
        let client = builder.build().unwrap();
        let cfg = client.config();
        assert_eq!(cfg.base_url.as_str(), "http://gpu-box:11434/");
        assert_eq!(cfg.max_retries, 7);
        assert_eq!(cfg.rate_limit, 2.5);
        assert_eq!(cfg.timeout, DEFAULT_TIMEOUT);
        assert!(cfg.debug);
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = ClientBuilder::new()
            .base_url("ftp://localhost:11434")
            .build()
            .unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("config.base_url")
        );
    }

    #[test]
    fn test_rejects_unparseable_url() {
        assert!(ClientBuilder::new().base_url("not a url").build().is_err());
    }

    #[test]
    fn test_rejects_zero_rate_limit() {
        let err = ClientBuilder::new().rate_limit(0.0).build().unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_max_wait_clamped_to_base_wait() {
        let client = ClientBuilder::new()
            .retry_wait_time(Duration::from_secs(5))
            .retry_max_wait_time(Duration::from_secs(2))
            .build()
            .unwrap();
        assert_eq!(client.config().retry_max_wait_time, Duration::from_secs(5));
    }
}
