//! The agent execution engine.
//!
//! [`Runner`] drives an [`Agent`] through its reasoning loop:
//!
//! 1. Build messages from instructions plus the conversation so far
//! 2. Call the provider with the agent's tool surface
//! 3. Classify the response into a [`NextStep`]
//! 4. Execute tool calls, one at a time and in call order (a delegation
//!    call runs the sub-agent to completion as a recursive child run)
//! 5. Append the observations and loop
//!
//! The loop ends when the model answers in plain text, a provider error
//! occurs, or the step limit is exhausted. Tool failures never end the
//! loop: they are rendered as observation strings and handed back to
//! the model, which decides how to recover.

use futures::future::BoxFuture;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::chat::{ChatProvider, ChatRequest, ChatResponse, ToolChoice};
use crate::error::{Error, Result};
use crate::message::Message;
use crate::tool::ToolDefinition;
use crate::usage::Usage;

use super::config::{Agent, delegation_task};
use super::result::{NextStep, RunConfig, RunResult, StepInfo, ToolCallRecord, ToolCallRequest};

/// Result of processing one classified step.
enum StepOutcome {
    Done(RunResult),
    Continue,
}

/// Mutable state accumulated over one run.
struct RunState<'a> {
    agent: &'a Agent,
    provider: &'a dyn ChatProvider,
    messages: Vec<Message>,
    step_history: Vec<StepInfo>,
    cumulative_usage: Usage,
    definitions: Vec<ToolDefinition>,
    max_steps: usize,
}

impl<'a> RunState<'a> {
    /// Validates the agent and builds the initial conversation.
    fn init(agent: &'a Agent, task: &str, config: &RunConfig) -> Result<Self> {
        agent.validate()?;

        let provider = agent.provider.as_deref().ok_or_else(|| {
            Error::Agent(format!(
                "agent '{}' has no provider configured, call .provider() before running",
                agent.name
            ))
        })?;

        let mut messages = Vec::new();
        let system_prompt = agent.resolve_instructions();
        if !system_prompt.is_empty() {
            messages.push(Message::system(system_prompt));
        }
        messages.push(Message::user(task));

        let definitions = agent
            .tools
            .iter()
            .map(|t| ToolDefinition::from_tool(t.as_ref()))
            .chain(agent.managed_agents.iter().map(Agent::tool_definition))
            .collect();

        Ok(Self {
            agent,
            provider,
            messages,
            step_history: Vec::new(),
            cumulative_usage: Usage::default(),
            definitions,
            max_steps: config.max_steps.unwrap_or(agent.max_steps),
        })
    }

    fn build_request(&self) -> ChatRequest {
        let mut request = ChatRequest::new(&self.agent.model, self.messages.clone());
        if !self.definitions.is_empty() {
            request = request
                .with_tools(self.definitions.clone())
                .with_tool_choice(ToolChoice::Auto);
        }
        if let Some(temperature) = self.agent.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.agent.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        request
    }

    fn accumulate_usage(&mut self, response: &ChatResponse) {
        if let Some(usage) = response.usage {
            self.cumulative_usage += usage;
        }
    }

    /// Classifies a response and executes its tool calls, if any.
    async fn process_step(&mut self, step: usize, response: ChatResponse) -> StepOutcome {
        match Runner::classify_response(&response) {
            NextStep::FinalOutput { output } => {
                self.messages.push(response.message.clone());
                self.step_history.push(StepInfo {
                    step,
                    response,
                    tool_calls: Vec::new(),
                });

                info!(
                    agent = %self.agent.name,
                    steps = step,
                    total_tokens = self.cumulative_usage.total_tokens,
                    "agent run completed",
                );

                StepOutcome::Done(RunResult {
                    output,
                    usage: self.cumulative_usage,
                    steps: step,
                    step_history: std::mem::take(&mut self.step_history),
                    messages: std::mem::take(&mut self.messages),
                    agent_name: self.agent.name.clone(),
                })
            }
            NextStep::ToolCalls { calls } => {
                self.messages.push(response.message.clone());

                // One call at a time, in the order the model emitted them,
                // so each observation lands before the next call runs.
                let mut records = Vec::with_capacity(calls.len());
                for call in &calls {
                    let record = Runner::execute_tool_call(call, self.agent).await;
                    self.messages.push(Message::tool(&record.id, &record.result));
                    records.push(record);
                }

                self.step_history.push(StepInfo {
                    step,
                    response,
                    tool_calls: records,
                });

                StepOutcome::Continue
            }
        }
    }
}

/// Stateless execution engine.
///
/// `Runner` owns nothing; all per-run state lives on the stack of the
/// run future, so the same agent can be run concurrently.
#[derive(Debug, Clone, Copy)]
pub struct Runner;

impl Runner {
    /// Runs an agent on a task to completion.
    ///
    /// Returns the final answer together with usage and per-step history.
    ///
    /// # Errors
    ///
    /// [`Error::Agent`] when the configuration is invalid (no provider,
    /// duplicate tool names), [`Error::MaxSteps`] when the step limit is
    /// exhausted, [`Error::Llm`] when a provider call fails.
    pub fn run<'a>(
        agent: &'a Agent,
        task: impl Into<String>,
        config: RunConfig,
    ) -> BoxFuture<'a, Result<RunResult>> {
        let task = task.into();
        let span = info_span!(
            "agent",
            agent.name = %agent.name,
            agent.model = %agent.model,
            agent.max_steps = agent.max_steps,
        );
        Box::pin(Self::run_inner(agent, task, config).instrument(span))
    }

    async fn run_inner(agent: &Agent, task: String, config: RunConfig) -> Result<RunResult> {
        let mut state = RunState::init(agent, &task, &config)?;

        for step in 1..=state.max_steps {
            debug!(agent = %agent.name, step, "starting step");

            let request = state.build_request();
            let response = state.provider.chat(&request).await.map_err(|e| {
                error!(error = %e, agent = %agent.name, step, "provider call failed");
                e
            })?;
            state.accumulate_usage(&response);

            match state.process_step(step, response).await {
                StepOutcome::Done(result) => return Ok(result),
                StepOutcome::Continue => {}
            }
        }

        let err = Error::MaxSteps {
            max_steps: state.max_steps,
        };
        error!(error = %err, agent = %agent.name, "step limit exhausted");
        Err(err)
    }

    /// A response with tool calls continues the loop; anything else is
    /// the final answer.
    fn classify_response(response: &ChatResponse) -> NextStep {
        if let Some(tool_calls) = response.tool_calls() {
            let calls: Vec<ToolCallRequest> = tool_calls.iter().map(ToolCallRequest::from).collect();
            if !calls.is_empty() {
                return NextStep::ToolCalls { calls };
            }
        }
        NextStep::FinalOutput {
            output: response.text().to_string(),
        }
    }

    /// Executes one tool call, resolving managed agents before tools.
    ///
    /// Failures are folded into the record rather than returned, so the
    /// model always receives an observation for every call it made.
    async fn execute_tool_call(call: &ToolCallRequest, agent: &Agent) -> ToolCallRecord {
        let tool_span = info_span!(
            "tool",
            tool.name = %call.name,
            tool.id = %call.id,
        );

        async {
            let (result, success) = if let Some(sub) = agent.find_managed(&call.name) {
                Self::dispatch_managed_agent(sub, call).await
            } else if let Some(tool) = agent.find_tool(&call.name) {
                match tool.call_dyn(call.arguments.clone()).await {
                    Ok(output) => (output, true),
                    Err(e) => {
                        warn!(tool = %call.name, error = %e, "tool call failed");
                        (format!("Tool '{}' failed: {e}", call.name), false)
                    }
                }
            } else {
                warn!(tool = %call.name, "unknown tool requested");
                (format!("Tool '{}' not found", call.name), false)
            };

            debug!(tool = %call.name, success, "tool call finished");
            ToolCallRecord {
                id: call.id.clone(),
                name: call.name.clone(),
                arguments: call.arguments.clone(),
                result,
                success,
            }
        }
        .instrument(tool_span)
        .await
    }

    /// Runs a managed sub-agent synchronously as a child run.
    async fn dispatch_managed_agent(sub: &Agent, call: &ToolCallRequest) -> (String, bool) {
        let Some(task) = delegation_task(&call.arguments) else {
            return (
                format!("Agent '{}' requires a 'task' string argument", sub.name),
                false,
            );
        };

        info!(to_agent = %sub.name, "delegating to managed agent");
        match Self::run(sub, task, RunConfig::default()).await {
            Ok(result) => (result.output, true),
            Err(e) => (format!("Agent '{}' failed: {e}", sub.name), false),
        }
    }
}
