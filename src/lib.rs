//! # ollama-lib-rust
//!
//! 本地 Ollama 推理服务的异步 Rust 客户端：限流、重试退避、流式解码。
//!
//! Async client for a local [Ollama](https://ollama.com) inference server.
//!
//! ## Overview
//!
//! Every typed operation (generate, chat, embeddings, model management) goes
//! through one request dispatcher:
//!
//! ```text
//! operation ─▶ rate limiter ─▶ encode ─▶ send / retry loop ─▶ classify
//!                                                   │
//!                         200 + stream ─▶ decode task ─▶ ResponseStream<T>
//!                         200          ─▶ decode one value
//!                         other        ─▶ Error::Api / Error::HttpStatus
//! ```
//!
//! - **Admission**: a token bucket shared by all calls on a client.
//! - **Resilience**: transport failures, 429 and 5xx are retried with capped
//!   exponential backoff; anything else is final.
//! - **Streaming**: newline-delimited JSON decoded by a background task into a
//!   bounded channel; dropping the stream stops the task.
//! - **Cancellation**: a [`CallContext`] (token plus deadline) is observed at
//!   every suspend point.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use ollama_lib_rust::types::{ChatMessage, ChatRequest};
//! use ollama_lib_rust::OllamaClient;
//!
//! #[tokio::main]
//! async fn main() -> ollama_lib_rust::Result<()> {
//!     let client = OllamaClient::builder()
//!         .base_url("http://localhost:11434")
//!         .max_retries(2)
//!         .build()?;
//!
//!     let req = ChatRequest::new("llama3.2:1b", vec![ChatMessage::user("Hello!")]);
//!     let mut stream = client.chat_stream(req).await?;
//!     while let Some(item) = stream.next().await {
//!         print!("{}", item?.message.content);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client, builder, call context, dispatcher and operations |
//! | [`pipeline`] | Incremental JSON decoding and the streaming conduit |
//! | [`resilience`] | Token-bucket rate limiter |
//! | [`transport`] | Single-attempt HTTP exchange over `reqwest` |
//! | [`types`] | Wire types and the keep-alive duration codec |
//! | [`logging`] | Injected logger capability |
//! | [`error`] | Error taxonomy |

pub mod client;
pub mod logging;
pub mod pipeline;
pub mod resilience;
pub mod transport;
pub mod types;

pub use client::{CallContext, ClientBuilder, ClientConfig, OllamaClient, RetryPolicy};
pub use logging::{InMemoryLogger, LogLevel, Logger, NoopLogger, TracingLogger};
pub use pipeline::{ChatStreamResponse, GenerateStreamResponse, ModelStreamResponse, ResponseStream};
pub use resilience::{RateLimiter, RateLimiterConfig};
pub use types::duration::{decode_duration, encode_duration, DurationError, KeepAlive};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
