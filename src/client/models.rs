//! Model management operations.

use crate::client::core::OllamaClient;
use crate::pipeline::ResponseStream;
use crate::types::model::{DeleteModelRequest, ModelList, ShowModelRequest};
use crate::types::{
    CopyModelRequest, CreateModelRequest, ModelInfo, ModelResponse, PullModelRequest,
    PushModelRequest, ShowModelOptions,
};
use crate::Result;
use reqwest::Method;

impl OllamaClient {
    /// Models available locally (`GET /api/tags`).
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let list: ModelList = self
            .call_json(Method::GET, "/api/tags", None::<&()>)
            .await?;
        Ok(list.models)
    }

    /// Models currently loaded in memory (`GET /api/ps`).
    pub async fn list_running_models(&self) -> Result<Vec<ModelInfo>> {
        let list: ModelList = self.call_json(Method::GET, "/api/ps", None::<&()>).await?;
        Ok(list.models)
    }

    pub async fn show_model(
        &self,
        name: &str,
        opts: Option<ShowModelOptions>,
    ) -> Result<ModelInfo> {
        let body = ShowModelRequest {
            model: name,
            verbose: opts.unwrap_or_default().verbose,
        };
        self.call_json(Method::POST, "/api/show", Some(&body)).await
    }

    pub async fn create_model(&self, req: &CreateModelRequest) -> Result<()> {
        self.call_unit(Method::POST, "/api/create", Some(req)).await
    }

    pub async fn copy_model(&self, req: &CopyModelRequest) -> Result<()> {
        self.call_unit(Method::POST, "/api/copy", Some(req)).await
    }

    pub async fn delete_model(&self, name: &str) -> Result<()> {
        let body = DeleteModelRequest { model: name };
        self.call_unit(Method::DELETE, "/api/delete", Some(&body))
            .await
    }

    /// Download a model; progress lines arrive on the stream.
    pub async fn pull_model(&self, mut req: PullModelRequest) -> Result<ResponseStream<ModelResponse>> {
        req.stream = true;
        self.call_stream(Method::POST, "/api/pull", Some(&req)).await
    }

    /// Upload a model; progress lines arrive on the stream.
    pub async fn push_model(&self, mut req: PushModelRequest) -> Result<ResponseStream<ModelResponse>> {
        req.stream = true;
        self.call_stream(Method::POST, "/api/push", Some(&req)).await
    }
}
