//! Run-level configuration and results.

use serde_json::Value;

use crate::chat::ChatResponse;
use crate::message::{Message, ToolCall};
use crate::usage::Usage;

/// Per-run overrides for [`Runner::run`](super::Runner::run).
#[derive(Debug, Default, Clone, Copy)]
pub struct RunConfig {
    /// Overrides the agent's step limit for this run.
    pub max_steps: Option<usize>,
}

impl RunConfig {
    /// Overrides the step limit.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
}

/// The outcome of a completed agent run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// The agent's final answer.
    pub output: String,
    /// Token usage accumulated over every provider call in this run.
    pub usage: Usage,
    /// How many reasoning steps the run took.
    pub steps: usize,
    /// Per-step record of responses and tool activity.
    pub step_history: Vec<StepInfo>,
    /// The full conversation, system prompt through final answer.
    pub messages: Vec<Message>,
    /// Name of the agent that produced this result.
    pub agent_name: String,
}

/// One reasoning step: the model's response and any tool activity it caused.
#[derive(Debug, Clone)]
pub struct StepInfo {
    /// 1-based step number.
    pub step: usize,
    /// The provider response for this step.
    pub response: ChatResponse,
    /// Tool calls executed in this step, in call order.
    pub tool_calls: Vec<ToolCallRecord>,
}

/// A completed tool invocation.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Provider-assigned call id.
    pub id: String,
    /// Tool or managed-agent name.
    pub name: String,
    /// Parsed arguments.
    pub arguments: Value,
    /// The observation fed back to the model.
    pub result: String,
    /// Whether the invocation succeeded.
    pub success: bool,
}

/// A tool call as extracted from a model response, arguments parsed.
#[derive(Debug, Clone)]
pub(crate) struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

impl From<&ToolCall> for ToolCallRequest {
    fn from(call: &ToolCall) -> Self {
        // Unparseable arguments are kept as a raw string so the tool's
        // deserialization error flows back to the model as an observation.
        let arguments = call
            .parse_arguments()
            .unwrap_or_else(|_| Value::String(call.function.arguments.clone()));
        Self {
            id: call.id.clone(),
            name: call.function.name.clone(),
            arguments,
        }
    }
}

/// What the model asked for in one step.
#[derive(Debug)]
pub(crate) enum NextStep {
    /// The model produced a final answer.
    FinalOutput { output: String },
    /// The model requested tool calls.
    ToolCalls { calls: Vec<ToolCallRequest> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_parses_arguments() {
        let call = ToolCall::function("c1", "web_search", r#"{"query":"gdp"}"#);
        let request = ToolCallRequest::from(&call);
        assert_eq!(request.arguments, json!({"query": "gdp"}));
    }

    #[test]
    fn request_keeps_malformed_arguments_raw() {
        let call = ToolCall::function("c1", "web_search", "{not json");
        let request = ToolCallRequest::from(&call);
        assert_eq!(request.arguments, json!("{not json"));
    }

    #[test]
    fn run_config_override() {
        let config = RunConfig::default().with_max_steps(3);
        assert_eq!(config.max_steps, Some(3));
    }
}
