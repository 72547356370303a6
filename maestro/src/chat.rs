//! Provider-neutral chat abstraction.
//!
//! [`ChatProvider`] is the seam between the reasoning loop and any
//! OpenAI-compatible backend. The loop only ever builds a
//! [`ChatRequest`] and inspects the [`ChatResponse`]; everything
//! transport-specific lives behind the trait.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::LlmError;
use crate::message::{Message, ToolCall};
use crate::tool::ToolDefinition;
use crate::usage::Usage;

/// A chat completion backend.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Sends one chat request and waits for the full response.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError>;

    /// Provider name used in logs and errors.
    fn name(&self) -> &str;
}

/// Shared handle to a provider, cloned into every agent that uses it.
pub type SharedChatProvider = Arc<dyn ChatProvider>;

/// How the model may use the supplied tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolChoice {
    /// The model decides whether to call tools.
    Auto,
    /// The model must call at least one tool.
    Required,
    /// Tool calls are disabled for this request.
    None,
    /// The model must call the named tool.
    Function(String),
}

impl ToolChoice {
    /// Wire representation for OpenAI-compatible APIs.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Auto => json!("auto"),
            Self::Required => json!("required"),
            Self::None => json!("none"),
            Self::Function(name) => json!({
                "type": "function",
                "function": {"name": name},
            }),
        }
    }
}

/// One chat completion request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model identifier as understood by the provider.
    pub model: String,
    /// Full conversation so far, system prompt first.
    pub messages: Vec<Message>,
    /// Tool definitions offered to the model.
    pub tools: Vec<ToolDefinition>,
    /// Tool-use policy for this request.
    pub tool_choice: Option<ToolChoice>,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Completion token cap.
    pub max_tokens: Option<u64>,
}

impl ChatRequest {
    /// A request with no tools and default sampling.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            tool_choice: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Offers the given tools to the model.
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Sets the tool-use policy.
    #[must_use]
    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Caps the completion length.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Natural end of turn.
    Stop,
    /// The model emitted tool calls.
    ToolCalls,
    /// The completion hit the token cap.
    Length,
    /// Anything else the provider reported.
    Other,
}

/// One chat completion response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// The assistant message produced by the model.
    pub message: Message,
    /// Why generation stopped.
    pub stop_reason: StopReason,
    /// Token accounting, when the provider reported it.
    pub usage: Option<Usage>,
    /// Model that actually served the request.
    pub model: Option<String>,
    /// Provider-assigned response id.
    pub id: Option<String>,
}

impl ChatResponse {
    /// Wraps an assistant message into a response.
    pub fn new(message: Message, stop_reason: StopReason) -> Self {
        Self {
            message,
            stop_reason,
            usage: None,
            model: None,
            id: None,
        }
    }

    /// A plain-text response ending the turn.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(Message::assistant(text), StopReason::Stop)
    }

    /// A response requesting the given tool calls.
    pub fn from_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self::new(
            Message::assistant_with_tool_calls(None, tool_calls),
            StopReason::ToolCalls,
        )
    }

    /// Attaches usage numbers.
    #[must_use]
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Text content of the assistant message.
    pub fn text(&self) -> &str {
        self.message.text()
    }

    /// Tool calls in the assistant message, if any.
    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        self.message.tool_calls.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod tool_choice {
        use super::*;

        #[test]
        fn auto_serializes_as_string() {
            assert_eq!(ToolChoice::Auto.to_value(), json!("auto"));
        }

        #[test]
        fn function_serializes_as_object() {
            let value = ToolChoice::Function("web_search".into()).to_value();
            assert_eq!(value["function"]["name"], "web_search");
        }
    }

    mod chat_response {
        use super::*;

        #[test]
        fn from_text_ends_turn() {
            let resp = ChatResponse::from_text("done");
            assert_eq!(resp.stop_reason, StopReason::Stop);
            assert_eq!(resp.text(), "done");
            assert!(resp.tool_calls().is_none());
        }

        #[test]
        fn from_tool_calls_sets_stop_reason() {
            let call = ToolCall::function("call_1", "web_search", "{}");
            let resp = ChatResponse::from_tool_calls(vec![call]);
            assert_eq!(resp.stop_reason, StopReason::ToolCalls);
            assert_eq!(resp.tool_calls().map(<[ToolCall]>::len), Some(1));
        }
    }
}
