use crate::transport::TransportError;
use crate::types::duration::DurationError;
use thiserror::Error;

/// Structured error context for configuration problems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Option or field that caused the error (e.g., "config.base_url", "config.rate_limit")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., the rejected value)
    pub details: Option<String>,
    /// Source of the error (e.g., "client_builder", "env")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the client.
///
/// Transport failures and retryable statuses (429, 5xx) never reach the caller
/// directly: the dispatcher retries them and, once attempts run out, reports
/// the last one wrapped in [`Error::AllRetriesFailed`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("server responded with retryable status {status}")]
    RetryableStatus { status: u16 },

    #[error("all retries failed after {attempts} attempts: {source}")]
    AllRetriesFailed {
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("ollama api error: {message} (status code: {status})")]
    Api { status: u16, message: String },

    #[error("http status {status}")]
    HttpStatus { status: u16 },

    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("cancelled while waiting for rate limiter")]
    RateLimitCancelled,

    #[error("request cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("invalid duration: {0}")]
    Duration(#[from] DurationError),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::RetryableStatus { status }
            | Error::Api { status, .. }
            | Error::HttpStatus { status } => Some(*status),
            Error::AllRetriesFailed { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Whether the dispatcher treats this failure as transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::RetryableStatus { .. })
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }
}
