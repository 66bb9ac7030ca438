use crate::client::core::OllamaClient;
use crate::pipeline::ResponseStream;
use crate::types::{GenerateRequest, GenerateResponse};
use crate::Result;
use reqwest::Method;

const GENERATE_PATH: &str = "/api/generate";

impl OllamaClient {
    /// Single-shot completion (`stream` forced off).
    pub async fn generate(&self, mut req: GenerateRequest) -> Result<GenerateResponse> {
        req.stream = false;
        self.call_json(Method::POST, GENERATE_PATH, Some(&req)).await
    }

    /// Streamed completion (`stream` forced on).
    ///
    /// Returns once the response head arrives; chunks follow on the stream.
    pub async fn generate_stream(
        &self,
        mut req: GenerateRequest,
    ) -> Result<ResponseStream<GenerateResponse>> {
        req.stream = true;
        self.call_stream(Method::POST, GENERATE_PATH, Some(&req)).await
    }
}
