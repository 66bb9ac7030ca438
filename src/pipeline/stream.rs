//! Background decode task and the stream handed to callers.
//!
//! One task per streamed response. It owns the response body, decodes JSON
//! values one at a time and publishes each on a channel of capacity 1, so at
//! most one decoded item is in flight ahead of the consumer. The task ends on
//! clean EOF, after publishing one terminal error, when the call context
//! fires, or when the consumer drops the stream. The body is dropped exactly
//! once, when the task returns.

use crate::client::CallContext;
use crate::pipeline::decode::JsonStreamDecoder;
use crate::transport::TransportError;
use crate::types::{ChatResponse, GenerateResponse, ModelResponse};
use crate::{Error, Result};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_util::sync::DropGuard;

/// Item of a streamed `/api/generate` call.
pub type GenerateStreamResponse = Result<GenerateResponse>;
/// Item of a streamed `/api/chat` call.
pub type ChatStreamResponse = Result<ChatResponse>;
/// Item of a pull or push progress stream.
pub type ModelStreamResponse = Result<ModelResponse>;

/// Lazy, finite, non-restartable sequence of decoded items.
///
/// Each item is either a decoded value or the single terminal error; after an
/// error the stream yields `None`. Dropping the stream stops the decode task
/// and releases the connection.
#[must_use = "streams do nothing unless polled"]
pub struct ResponseStream<T> {
    rx: mpsc::Receiver<Result<T>>,
    _cancel_on_drop: DropGuard,
}

impl<T> ResponseStream<T> {
    /// Next item, or `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<Result<T>> {
        self.rx.recv().await
    }

    /// Drain the stream, stopping at the first error.
    pub async fn collect_all(mut self) -> Result<Vec<T>> {
        let mut out = Vec::new();
        while let Some(item) = self.rx.recv().await {
            out.push(item?);
        }
        Ok(out)
    }
}

impl<T> Stream for ResponseStream<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl<T> std::fmt::Debug for ResponseStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseStream")
            .field("closed", &self.rx.is_closed())
            .finish()
    }
}

/// Spawn the decode task over `body` and return its output stream.
///
/// `ctx` should be a child of the call context: the returned stream cancels
/// it on drop.
pub(crate) fn spawn_decode_task<S, E, T>(body: S, ctx: CallContext) -> ResponseStream<T>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Into<TransportError> + Send + 'static,
    T: DeserializeOwned + Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);
    let guard = ctx.token().clone().drop_guard();
    tokio::spawn(decode_body(body, tx, ctx));
    ResponseStream {
        rx,
        _cancel_on_drop: guard,
    }
}

enum Published {
    Sent,
    ConsumerGone,
    Cancelled,
}

async fn publish<T>(tx: &mpsc::Sender<Result<T>>, ctx: &CallContext, item: Result<T>) -> Published {
    tokio::select! {
        biased;
        _ = ctx.cancelled() => Published::Cancelled,
        sent = tx.send(item) => match sent {
            Ok(()) => Published::Sent,
            Err(_) => Published::ConsumerGone,
        },
    }
}

/// One decoded value, or the `{"error": "..."}` object the server writes when
/// a stream fails after the 200 head went out.
#[derive(Deserialize)]
#[serde(untagged)]
enum StreamLine<T> {
    Failure { error: String },
    Item(T),
}

fn into_item<T>(line: std::result::Result<StreamLine<T>, serde_json::Error>) -> Result<T> {
    match line {
        Ok(StreamLine::Item(value)) => Ok(value),
        Ok(StreamLine::Failure { error }) => Err(Error::Api {
            status: 200,
            message: error,
        }),
        Err(e) => Err(Error::Decode(e)),
    }
}

async fn decode_body<S, E, T>(body: S, tx: mpsc::Sender<Result<T>>, ctx: CallContext)
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Into<TransportError>,
    T: DeserializeOwned,
{
    let mut body = Box::pin(body);
    let mut decoder = JsonStreamDecoder::new();
    let mut eof = false;

    // Some on a transport failure, None once the context fired
    let failure = loop {
        let next = if eof {
            decoder.decode_eof::<StreamLine<T>>()
        } else {
            decoder.decode_next::<StreamLine<T>>()
        };

        if let Some(line) = next {
            let item = into_item(line);
            let terminal = item.is_err();
            match publish(&tx, &ctx, item).await {
                Published::Sent if !terminal => continue,
                Published::Cancelled => break None,
                _ => return,
            }
        }
        if eof {
            return;
        }

        let chunk = tokio::select! {
            biased;
            _ = ctx.cancelled() => break None,
            chunk = body.next() => chunk,
        };
        match chunk {
            Some(Ok(bytes)) => decoder.feed(&bytes),
            Some(Err(e)) => break Some(Error::Transport(e.into())),
            None => eof = true,
        }
    };

    // release the connection before reporting
    drop(body);
    if let Some(err) = failure {
        if !matches!(publish(&tx, &ctx, Err(err)).await, Published::Cancelled) {
            return;
        }
    }
    // the context has fired; this only waits for the consumer to read or drop
    if !tx.is_closed() {
        let _ = tx.send(Err(ctx.cancel_error())).await;
    }
}
