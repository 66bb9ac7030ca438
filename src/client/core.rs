use crate::client::builder::{ClientBuilder, ClientConfig};
use crate::client::policy::RetryPolicy;
use crate::client::CallContext;
use crate::logging::Logger;
use crate::resilience::{RateLimiter, RateLimiterSnapshot};
use crate::transport::HttpTransport;
use crate::Result;
use std::sync::Arc;

/// State shared by every handle of one client.
pub(crate) struct ClientInner {
    pub(crate) config: ClientConfig,
    pub(crate) retry: RetryPolicy,
    pub(crate) transport: HttpTransport,
    pub(crate) logger: Arc<dyn Logger>,
    pub(crate) limiter: RateLimiter,
}

/// Client for a local Ollama server.
///
/// Cloning is cheap and clones share the transport, rate limiter and logger,
/// so one client can serve any number of concurrent calls.
///
/// ```rust,no_run
/// use ollama_lib_rust::{OllamaClient, types::GenerateRequest};
///
/// # async fn run() -> ollama_lib_rust::Result<()> {
/// let client = OllamaClient::new()?;
/// let resp = client
///     .generate(GenerateRequest::new("llama3.2:1b", "Why is the sky blue?"))
///     .await?;
/// println!("{}", resp.response);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OllamaClient {
    pub(crate) inner: Arc<ClientInner>,
    pub(crate) ctx: CallContext,
}

impl OllamaClient {
    /// Client with default options.
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// Client configured from `OLLAMA_*` environment variables.
    pub fn from_env() -> Result<Self> {
        ClientBuilder::from_env().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn from_parts(inner: Arc<ClientInner>, ctx: CallContext) -> Self {
        Self { inner, ctx }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Handle whose calls observe `ctx` (cancellation and deadline).
    ///
    /// Shares everything else with `self`.
    pub fn with_context(&self, ctx: CallContext) -> Self {
        Self::from_parts(Arc::clone(&self.inner), ctx)
    }

    pub fn context(&self) -> &CallContext {
        &self.ctx
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.inner.limiter
    }

    pub async fn rate_limiter_snapshot(&self) -> RateLimiterSnapshot {
        self.inner.limiter.snapshot().await
    }

    pub(crate) fn logger(&self) -> &dyn Logger {
        self.inner.logger.as_ref()
    }
}

impl std::fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaClient")
            .field("config", &self.inner.config)
            .field("ctx", &self.ctx)
            .finish()
    }
}
