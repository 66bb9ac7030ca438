//! 类型系统模块：定义与 Ollama 服务端协议一致的请求/响应数据类型。
//!
//! # Types Module
//!
//! Plain request/response values exchanged with the inference server. Field
//! names are fixed by the server protocol (snake_case); the only value with
//! behaviour beyond (de)serialization is [`KeepAlive`].
//!
//! ## Submodules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`duration`] | Compact duration text codec (`"2d5h30m"`) |
//! | [`generate`] | `/api/generate` shapes |
//! | [`chat`] | `/api/chat` shapes |
//! | [`message`] | Chat messages and roles |
//! | [`tool`] | Tool definitions and tool calls |
//! | [`model`] | Model management shapes |
//! | [`embeddings`] | `/api/embeddings` shapes |
//!
//! ## Example
//!
//! ```rust
//! use ollama_lib_rust::types::{ChatMessage, ChatRequest, KeepAlive};
//!
//! let req = ChatRequest::new("llama3.2:1b", vec![ChatMessage::user("Hello")])
//!     .with_keep_alive(KeepAlive::from_mins(5));
//! assert_eq!(req.keep_alive.unwrap().to_string(), "5m");
//! ```

pub mod chat;
pub mod duration;
pub mod embeddings;
pub mod generate;
pub mod message;
pub mod model;
pub mod tool;

pub use chat::{ChatRequest, ChatResponse};
pub use duration::{decode_duration, encode_duration, DurationError, KeepAlive};
pub use embeddings::{EmbeddingRequest, EmbeddingResponse};
pub use generate::{GenerateRequest, GenerateResponse};
pub use message::{ChatMessage, MessageRole};
pub use model::{
    CopyModelRequest, CreateModelRequest, ModelInfo, ModelResponse, PullModelRequest,
    PushModelRequest, ShowModelOptions,
};
pub use tool::{PropertyField, Tool, ToolCall, ToolCallFunction, ToolFunction, ToolParameters};
