//! OpenAI chat completions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chat::{ChatProvider, ChatRequest, ChatResponse, StopReason};
use crate::error::{LlmError, LlmErrorKind};
use crate::message::{FunctionCall, Message, Role, ToolCall};
use crate::usage::Usage;

use super::config::OpenAIConfig;

/// Chat completions request body.
#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    id: Option<String>,
    model: Option<String>,
    choices: Vec<WireChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireErrorResponse {
    error: WireError,
}

#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<String>,
}

/// Chat provider backed by an OpenAI-compatible HTTP endpoint.
#[derive(Debug, Clone)]
pub struct OpenAI {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAI {
    /// Creates a client from the given configuration.
    ///
    /// Fails immediately on an empty API key rather than at first use.
    pub fn new(config: OpenAIConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::auth("openai", "API key is required"));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let client = builder.build().map_err(|e| {
            LlmError::new(
                LlmErrorKind::Internal,
                "openai",
                format!("failed to create HTTP client: {e}"),
            )
        })?;

        Ok(Self { config, client })
    }

    /// Creates a client from the environment (see [`OpenAIConfig::from_env`]).
    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(OpenAIConfig::from_env()?)
    }

    /// The default model for this client.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn encode_message(msg: &Message) -> WireMessage {
        let role = match msg.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };

        WireMessage {
            role: role.to_owned(),
            content: msg.content.clone(),
            tool_calls: msg.tool_calls.as_ref().map(|calls| {
                calls
                    .iter()
                    .map(|tc| WireToolCall {
                        id: tc.id.clone(),
                        call_type: "function".to_owned(),
                        function: WireFunctionCall {
                            name: tc.function.name.clone(),
                            arguments: tc.function.arguments.clone(),
                        },
                    })
                    .collect()
            }),
            tool_call_id: msg.tool_call_id.clone(),
        }
    }

    fn build_body(&self, request: &ChatRequest) -> WireRequest {
        let model = if request.model.is_empty() {
            self.config.model.clone()
        } else {
            request.model.clone()
        };

        WireRequest {
            model,
            messages: request.messages.iter().map(Self::encode_message).collect(),
            temperature: request.temperature,
            max_completion_tokens: request.max_tokens,
            tools: if request.tools.is_empty() {
                None
            } else {
                Some(request.tools.iter().map(|t| t.to_openai_value()).collect())
            },
            tool_choice: request.tool_choice.as_ref().map(|c| c.to_value()),
        }
    }

    fn decode_response(response: WireResponse) -> Result<ChatResponse, LlmError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::response_format("openai", "response contained no choices"))?;

        let tool_calls = choice.message.tool_calls.map(|calls| {
            calls
                .into_iter()
                .map(|tc| ToolCall {
                    id: tc.id,
                    call_type: tc.call_type,
                    function: FunctionCall {
                        name: tc.function.name,
                        arguments: tc.function.arguments,
                    },
                })
                .collect::<Vec<_>>()
        });

        let message = Message {
            role: Role::Assistant,
            content: choice.message.content,
            tool_calls,
            tool_call_id: None,
        };

        let stop_reason = match choice.finish_reason.as_deref() {
            Some("stop") => StopReason::Stop,
            Some("tool_calls") => StopReason::ToolCalls,
            Some("length") => StopReason::Length,
            // Some gateways omit finish_reason on tool-call turns.
            None if message.has_tool_calls() => StopReason::ToolCalls,
            None => StopReason::Stop,
            Some(_) => StopReason::Other,
        };

        Ok(ChatResponse {
            message,
            stop_reason,
            usage: response.usage,
            model: response.model,
            id: response.id,
        })
    }

    fn decode_error(status: u16, body: &str) -> LlmError {
        if let Ok(parsed) = serde_json::from_str::<WireErrorResponse>(body) {
            let error = parsed.error;
            let code = error.code.or(error.error_type);
            let kind = match status {
                401 | 403 => LlmErrorKind::Auth,
                429 => LlmErrorKind::RateLimited,
                400 => LlmErrorKind::InvalidRequest,
                _ => LlmErrorKind::Provider,
            };
            let mut err = LlmError::new(kind, "openai", error.message);
            if let Some(code) = code {
                err = err.with_code(code);
            }
            return err;
        }

        LlmError::new(LlmErrorKind::HttpStatus(status), "openai", body.to_owned())
    }
}

#[async_trait]
impl ChatProvider for OpenAI {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let body = self.build_body(request);

        let mut http = self
            .client
            .post(self.chat_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body);
        if let Some(org) = &self.config.organization {
            http = http.header("OpenAI-Organization", org);
        }

        let response = http.send().await.map_err(LlmError::from)?;
        let status = response.status();
        let text = response.text().await.map_err(LlmError::from)?;

        if !status.is_success() {
            return Err(Self::decode_error(status.as_u16(), &text));
        }

        let wire: WireResponse = serde_json::from_str(&text).map_err(|e| {
            LlmError::response_format("openai", format!("failed to parse response: {e}"))
        })?;
        Self::decode_response(wire)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
