//! Ollama client.
//!
//! Keep the public surface small and predictable: one [`OllamaClient`], one
//! [`ClientBuilder`], and a [`CallContext`] for cancellation. Implementation
//! is split into submodules under `src/client/`.

pub mod builder;
mod chat;
pub mod context;
pub mod core;
mod embeddings;
mod execution;
mod generate;
mod models;
mod policy;

pub use builder::{ClientBuilder, ClientConfig};
pub use context::CallContext;
pub use self::core::OllamaClient;
pub use policy::RetryPolicy;
