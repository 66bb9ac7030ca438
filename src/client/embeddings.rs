use crate::client::core::OllamaClient;
use crate::types::{EmbeddingRequest, EmbeddingResponse};
use crate::Result;
use reqwest::Method;

impl OllamaClient {
    /// Embedding vector for one prompt (`POST /api/embeddings`).
    pub async fn embeddings(&self, req: &EmbeddingRequest) -> Result<EmbeddingResponse> {
        self.call_json(Method::POST, "/api/embeddings", Some(req)).await
    }
}
