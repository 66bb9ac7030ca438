//! 请求分发：限流 → 编码 → 重试循环 → 状态分类。
//!
//! The request dispatcher. Every façade operation funnels through
//! [`OllamaClient::send_request`]:
//!
//! 1. take one rate-limiter token (cancellation surfaces as
//!    [`Error::RateLimitCancelled`], never retried);
//! 2. encode the body once (failure is [`Error::Encode`], never retried);
//! 3. run attempts `0..=max_retries`, sleeping the capped backoff before each
//!    retry; transport failures, 429 and 5xx go round again, anything else
//!    ends the loop;
//! 4. classify the final response: 200 hands back the open body, other
//!    statuses become [`Error::Api`] or [`Error::HttpStatus`].

use crate::client::core::OllamaClient;
use crate::client::policy::{classify_status, Decision, StatusClass};
use crate::pipeline::stream::{spawn_decode_task, ResponseStream};
use crate::{Error, Result};
use bytes::Bytes;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::Instrument;
use uuid::Uuid;

/// `{"error": "..."}` body the server sends with non-200 statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl OllamaClient {
    /// Run `fut` unless the call context fires first.
    async fn until_cancelled<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = T>,
    {
        tokio::select! {
            biased;
            _ = self.ctx.cancelled() => Err(self.ctx.cancel_error()),
            out = fut => Ok(out),
        }
    }

    fn debug_line(&self, message: impl FnOnce() -> String) {
        if self.inner.config.debug {
            self.logger().debug(&message());
        }
    }

    /// Send one logical request and return the response with its body still
    /// open. Only a 200 comes back as `Ok`.
    pub(crate) async fn send_request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let request_id = Uuid::new_v4().to_string();
        let span = tracing::debug_span!(
            target: "ollama_lib_rust",
            "ollama_request",
            request_id = request_id.as_str(),
            method = %method,
            path
        );
        self.dispatch(method, path, body, &request_id)
            .instrument(span)
            .await
    }

    async fn dispatch<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        request_id: &str,
    ) -> Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let inner = &self.inner;
        inner.limiter.acquire(&self.ctx).await?;

        let payload: Option<Bytes> = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(Error::Encode)?
            .map(Bytes::from);

        let url = inner.transport.url(path);
        let retry = inner.retry;
        let mut attempt: u32 = 0;

        let resp = loop {
            self.debug_line(|| format!("Sending request: {method} {url}"));

            let sent = self
                .until_cancelled(inner.transport.send(
                    method.clone(),
                    path,
                    payload.clone(),
                    request_id,
                ))
                .await?;

            let failure = match sent {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    self.debug_line(|| format!("Receiving response: {method} {url} ({status})"));
                    match classify_status(status) {
                        StatusClass::Retryable => {
                            drop(resp);
                            Error::RetryableStatus { status }
                        }
                        StatusClass::Success | StatusClass::Final => break resp,
                    }
                }
                Err(e) => {
                    self.logger().error(&format!("Request failed: {e}"));
                    Error::Transport(e)
                }
            };

            match retry.decide(&failure, attempt) {
                Decision::Retry { delay } => {
                    attempt += 1;
                    self.debug_line(|| {
                        format!(
                            "Retrying request (attempt {attempt}/{}) in {delay:?}",
                            retry.max_retries
                        )
                    });
                    self.until_cancelled(tokio::time::sleep(delay)).await?;
                }
                Decision::Fail => {
                    let err = Error::AllRetriesFailed {
                        attempts: attempt + 1,
                        source: Box::new(failure),
                    };
                    self.logger().error(&format!("Request failed: {err}"));
                    return Err(err);
                }
            }
        };

        let status = resp.status().as_u16();
        if classify_status(status) == StatusClass::Success {
            return Ok(resp);
        }

        // body is consumed (and the connection released) on every error path
        let body = self.until_cancelled(resp.bytes()).await?.unwrap_or_default();
        let err = match serde_json::from_slice::<ErrorBody>(&body) {
            Ok(ErrorBody { error }) => Error::Api {
                status,
                message: error,
            },
            Err(_) => Error::HttpStatus { status },
        };
        self.logger().error(&format!("Request failed: {err}"));
        Err(err)
    }

    /// Read the whole body and decode one JSON value.
    pub(crate) async fn decode_json<T>(&self, resp: reqwest::Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let body = self
            .until_cancelled(resp.bytes())
            .await?
            .map_err(|e| Error::Transport(e.into()))?;
        serde_json::from_slice(&body).map_err(Error::Decode)
    }

    /// Dispatch and decode a single JSON response.
    pub(crate) async fn call_json<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send_request(method, path, body).await?;
        self.decode_json(resp).await
    }

    /// Dispatch and discard the (successful) response body.
    pub(crate) async fn call_unit<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let resp = self.send_request(method, path, body).await?;
        self.until_cancelled(resp.bytes())
            .await?
            .map_err(|e| Error::Transport(e.into()))?;
        Ok(())
    }

    /// Dispatch and hand the open body to a background decode task.
    ///
    /// Returns as soon as the response head is in; items arrive through the
    /// returned stream.
    pub(crate) async fn call_stream<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ResponseStream<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Send + 'static,
    {
        let resp = self.send_request(method, path, body).await?;
        let chunks = resp.bytes_stream();
        Ok(spawn_decode_task(chunks, self.ctx.child()))
    }
}
