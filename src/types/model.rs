//! Model management shapes: list, show, create, copy, delete, pull, push, ps

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Model description as returned by `/api/tags`, `/api/show` and `/api/ps`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelInfo {
    pub name: String,
    #[serde(alias = "modified_at", skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    pub size: u64,
    pub digest: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub license: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub modelfile: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parameters: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub template: String,

    /// When a loaded model will be evicted (`/api/ps` only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Bytes resident in VRAM (`/api/ps` only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_vram: Option<u64>,
}

/// Envelope of the list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ModelList {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

/// Optional parameters for show model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowModelOptions {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ShowModelRequest<'a> {
    pub model: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DeleteModelRequest<'a> {
    pub model: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateModelRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub modelfile: String,
}

impl CreateModelRequest {
    pub fn new(name: impl Into<String>, modelfile: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            modelfile: modelfile.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopyModelRequest {
    pub source: String,
    pub destination: String,
}

impl CopyModelRequest {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Pull request. Always streamed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullModelRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub insecure: bool,
    #[serde(default)]
    pub stream: bool,
}

impl PullModelRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Push request. Always streamed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushModelRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub insecure: bool,
    #[serde(default)]
    pub stream: bool,
}

impl PushModelRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Progress line of a pull or push.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<u64>,
}
