use crate::client::core::OllamaClient;
use crate::pipeline::ResponseStream;
use crate::types::{ChatRequest, ChatResponse};
use crate::Result;
use reqwest::Method;

const CHAT_PATH: &str = "/api/chat";

impl OllamaClient {
    /// One chat turn (`stream` forced off).
    pub async fn chat(&self, mut req: ChatRequest) -> Result<ChatResponse> {
        req.stream = false;
        self.call_json(Method::POST, CHAT_PATH, Some(&req)).await
    }

    /// Streamed chat turn (`stream` forced on). Each item carries a partial
    /// assistant message; the last one has `done: true`.
    pub async fn chat_stream(&self, mut req: ChatRequest) -> Result<ResponseStream<ChatResponse>> {
        req.stream = true;
        self.call_stream(Method::POST, CHAT_PATH, Some(&req)).await
    }
}
