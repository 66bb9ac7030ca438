//! Mock HTTP server setup for integration tests

#![allow(dead_code)]

use mockito::{Matcher, Mock, Server, ServerGuard};
use ollama_lib_rust::{ClientBuilder, InMemoryLogger, OllamaClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
    pub logger: InMemoryLogger,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
            logger: InMemoryLogger::new(256),
        }
    }

    /// Builder pointed at the mock server, with short backoffs, a generous
    /// rate limit and the fixture's in-memory logger.
    pub fn builder(&self) -> ClientBuilder {
        ClientBuilder::new()
            .base_url(&self.base_url)
            .retry_wait_time(Duration::from_millis(10))
            .retry_max_wait_time(Duration::from_millis(40))
            .rate_limit(1000.0)
            .timeout(Duration::from_secs(5))
            .debug(true)
            .logger(Arc::new(self.logger.clone()))
    }

    pub fn client(&self) -> OllamaClient {
        self.builder().build().expect("client should build")
    }

    /// JSON response for `method path`, expected `hits` times.
    pub async fn mock_json(
        &self,
        method: &str,
        path: &str,
        status: u16,
        body: &str,
        hits: usize,
    ) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(method, path)
            .with_status(status as usize)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    /// JSON response that only matches when the request body contains `partial`.
    pub async fn mock_json_matching(
        &self,
        method: &str,
        path: &str,
        partial: serde_json::Value,
        body: &str,
    ) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(method, path)
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(partial))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(1)
            .create_async()
            .await
    }

    /// Newline-delimited JSON body, matched on a partial request body.
    pub async fn mock_ndjson(
        &self,
        path: &str,
        partial: serde_json::Value,
        lines: &[&str],
    ) -> Mock {
        let body: String = lines.iter().map(|l| format!("{l}\n")).collect();
        let mut server = self.server.lock().await;
        server
            .mock("POST", path)
            .match_body(Matcher::PartialJson(partial))
            .with_status(200)
            .with_header("content-type", "application/x-ndjson")
            .with_body(body)
            .expect(1)
            .create_async()
            .await
    }

    /// Status-only response with an arbitrary body, expected `hits` times.
    pub async fn mock_status(&self, method: &str, path: &str, status: u16, body: &str, hits: usize) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(method, path)
            .with_status(status as usize)
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }
}

pub const GENERATE_OK: &str = r#"{"model":"llama2","created_at":"2024-10-01T08:00:00Z","response":"The sky is blue.","done":true,"eval_count":5}"#;
