//! 流式响应处理模块：增量 JSON 解码与后台解码任务。
//!
//! # Streaming Pipeline
//!
//! Streamed endpoints (`/api/generate` and `/api/chat` with `stream: true`,
//! `/api/pull`, `/api/push`) answer with a sequence of concatenated JSON
//! values over one long-lived body.
//!
//! ```text
//! HTTP body ─▶ JsonStreamDecoder ─▶ mpsc(1) ─▶ ResponseStream<T>
//!  (chunks)     (one value at a       (one item      (futures::Stream
//!                time, any framing)    in flight)     of Result<T>)
//! ```
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`decode`] | Incremental decoder over a byte buffer |
//! | [`stream`] | Background decode task and [`ResponseStream`] |

pub mod decode;
pub mod stream;

pub use decode::JsonStreamDecoder;
pub use stream::{ChatStreamResponse, GenerateStreamResponse, ModelStreamResponse, ResponseStream};
