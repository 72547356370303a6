//! Error types for agents, tools, and providers.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for agent runs.
#[derive(Debug, Error)]
pub enum Error {
    /// A chat provider call failed.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// A tool failed in a way that could not be reported back to the model.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Agent configuration or orchestration error.
    #[error("agent error: {0}")]
    Agent(String),

    /// The reasoning loop hit its step limit without producing a final answer.
    #[error("agent exceeded maximum steps ({max_steps})")]
    MaxSteps {
        /// The configured step limit that was exhausted.
        max_steps: usize,
    },

    /// JSON serialization or deserialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// What class of failure a provider reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Missing or rejected credentials.
    Auth,
    /// The provider throttled the request.
    RateLimited,
    /// Transport-level failure (DNS, TLS, connect, timeout).
    Network,
    /// The response body did not match the expected shape.
    ResponseFormat,
    /// Non-success HTTP status without a structured error body.
    HttpStatus(u16),
    /// The request was rejected as malformed.
    InvalidRequest,
    /// An error reported by the provider itself.
    Provider,
    /// Anything else.
    Internal,
}

impl std::fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth => write!(f, "auth"),
            Self::RateLimited => write!(f, "rate_limited"),
            Self::Network => write!(f, "network"),
            Self::ResponseFormat => write!(f, "response_format"),
            Self::HttpStatus(code) => write!(f, "http_status({code})"),
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::Provider => write!(f, "provider"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Error returned by [`ChatProvider`](crate::chat::ChatProvider) implementations.
#[derive(Debug, Error)]
#[error("{provider} error ({kind}): {message}")]
pub struct LlmError {
    /// Failure class, usable for retry decisions by callers.
    pub kind: LlmErrorKind,
    /// Which provider produced the error.
    pub provider: String,
    /// Human-readable description.
    pub message: String,
    /// Provider-specific error code, when one was returned.
    pub code: Option<String>,
}

impl LlmError {
    /// Creates a new error for the given provider.
    pub fn new(kind: LlmErrorKind, provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            provider: provider.into(),
            message: message.into(),
            code: None,
        }
    }

    /// Attaches a provider-specific error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Missing or rejected credentials.
    pub fn auth(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Auth, provider, message)
    }

    /// Whether retrying the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            LlmErrorKind::RateLimited | LlmErrorKind::Network | LlmErrorKind::HttpStatus(500..=599)
        )
    }

    /// Response body did not parse into the expected shape.
    pub fn response_format(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::ResponseFormat, provider, message)
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() || err.is_connect() {
            LlmErrorKind::Network
        } else if let Some(status) = err.status() {
            LlmErrorKind::HttpStatus(status.as_u16())
        } else {
            LlmErrorKind::Network
        };
        Self::new(kind, "http", err.to_string())
    }
}

/// Error produced by a [`Tool`](crate::tool::Tool) invocation.
///
/// Inside the reasoning loop these are normally converted to failed
/// observation strings and fed back to the model rather than surfaced
/// to the caller.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool ran but failed.
    #[error("tool execution failed: {0}")]
    Execution(String),

    /// The model supplied arguments that did not match the tool's schema.
    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),

    /// The model requested a tool the agent does not have.
    #[error("unknown tool: {0}")]
    NotFound(String),

    /// Anything else.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ToolError {
    /// Wraps an arbitrary error as an execution failure.
    pub fn execution(err: impl std::fmt::Display) -> Self {
        Self::Execution(err.to_string())
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidArguments(err.to_string())
    }
}
