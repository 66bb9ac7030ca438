use bytes::Bytes;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use std::time::Duration;
use url::Url;

/// Thin wrapper over a shared `reqwest::Client` rooted at the server base URL.
///
/// One attempt per [`send`](HttpTransport::send); retries live in the
/// dispatcher.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport with its own connection pool and an overall
    /// per-request `timeout` (covers the body read too).
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(32)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(TransportError::Http)?;
        Ok(Self::with_client(base_url, client))
    }

    /// Use a caller-provided client as is; its own timeouts apply.
    pub fn with_client(base_url: &Url, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one request. `body` is already-encoded JSON and is cheap to clone
    /// between attempts.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
        request_id: &str,
    ) -> Result<reqwest::Response, TransportError> {
        let mut req = self
            .client
            .request(method, self.url(path))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if let Ok(id) = HeaderValue::from_str(request_id) {
            // correlation only; the server ignores it
            req = req.header("x-request-id", id);
        }
        if let Some(body) = body {
            req = req.body(body);
        }

        req.send().await.map_err(TransportError::Http)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Http(e) if e.is_timeout())
    }

    pub fn is_connect(&self) -> bool {
        matches!(self, TransportError::Http(e) if e.is_connect())
    }
}
