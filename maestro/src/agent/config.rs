//! Agent configuration.

use std::collections::HashSet;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::chat::SharedChatProvider;
use crate::error::{Error, Result};
use crate::tool::{BoxedTool, Tool, ToolDefinition};

use super::result::{RunConfig, RunResult};
use super::runner::Runner;

/// Step limit used when neither the agent nor the run overrides it.
pub const DEFAULT_MAX_STEPS: usize = 10;

const DEFAULT_INSTRUCTIONS: &str = "You are a helpful assistant. Use the available tools \
     to gather information when you need it, then answer the user's request directly.";

/// Configuration for a single agent.
///
/// Built with the fluent methods and then executed with
/// [`Runner::run`](super::Runner::run). Managed sub-agents are owned by
/// value, so a delegation hierarchy is always a finite tree.
pub struct Agent {
    /// Unique name. For managed agents this is the tool name the parent's
    /// model uses to delegate.
    pub name: String,
    /// What this agent is for, shown to a parent agent's model.
    pub description: String,
    /// System instructions. Falls back to a generic prompt when empty.
    pub instructions: Option<String>,
    /// Model identifier passed to the provider.
    pub model: String,
    /// The chat backend. Required before running.
    pub provider: Option<SharedChatProvider>,
    /// Tools available to this agent.
    pub tools: Vec<BoxedTool>,
    /// Sub-agents this agent can delegate to.
    pub managed_agents: Vec<Agent>,
    /// Step limit for a run of this agent.
    pub max_steps: usize,
    /// Sampling temperature forwarded to the provider.
    pub temperature: Option<f64>,
    /// Completion token cap forwarded to the provider.
    pub max_tokens: Option<u64>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("tools", &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field(
                "managed_agents",
                &self.managed_agents.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
            )
            .field("max_steps", &self.max_steps)
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// A new agent with the given name and defaults otherwise.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            instructions: None,
            model: String::new(),
            provider: None,
            tools: Vec::new(),
            managed_agents: Vec::new(),
            max_steps: DEFAULT_MAX_STEPS,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Sets the description shown to a delegating parent.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the system instructions.
    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the chat provider.
    #[must_use]
    pub fn provider(mut self, provider: SharedChatProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Registers a tool.
    #[must_use]
    pub fn tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Box::new(tool));
        self
    }

    /// Registers an already-boxed tool.
    #[must_use]
    pub fn boxed_tool(mut self, tool: BoxedTool) -> Self {
        self.tools.push(tool);
        self
    }

    /// Adds a managed sub-agent this agent may delegate to.
    #[must_use]
    pub fn managed_agent(mut self, agent: Agent) -> Self {
        self.managed_agents.push(agent);
        self
    }

    /// Sets the step limit.
    #[must_use]
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Caps completion length per provider call.
    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Runs this agent on a task. Shorthand for [`Runner::run`].
    pub fn run<'a>(
        &'a self,
        task: impl Into<String>,
        config: RunConfig,
    ) -> BoxFuture<'a, Result<RunResult>> {
        Runner::run(self, task, config)
    }

    /// The system prompt for a run of this agent.
    pub(crate) fn resolve_instructions(&self) -> String {
        let base = self
            .instructions
            .as_deref()
            .unwrap_or(DEFAULT_INSTRUCTIONS)
            .to_string();

        if self.managed_agents.is_empty() {
            return base;
        }

        let mut prompt = base;
        prompt.push_str("\n\nYou lead a team. Delegate work by calling a team member \
             like a tool, passing the full task as the 'task' argument:\n");
        for member in &self.managed_agents {
            prompt.push_str(&format!("- {}: {}\n", member.name, member.description));
        }
        prompt
    }

    /// The tool surface a delegating parent advertises for this agent.
    pub(crate) fn tool_definition(&self) -> ToolDefinition {
        let description = if self.description.is_empty() {
            format!("Delegates a task to the '{}' agent.", self.name)
        } else {
            self.description.clone()
        };

        ToolDefinition {
            name: self.name.clone(),
            description,
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "task": {
                        "type": "string",
                        "description": "A complete, self-contained description of the task \
                             for this agent, including all context it needs"
                    }
                },
                "required": ["task"]
            }),
        }
    }

    /// Checks that every tool and managed-agent name is unique, recursively.
    ///
    /// Duplicate names would make tool-call dispatch ambiguous, so this is
    /// rejected before any provider call is made.
    pub(crate) fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for name in self
            .tools
            .iter()
            .map(|t| t.name())
            .chain(self.managed_agents.iter().map(|a| a.name.as_str()))
        {
            if !seen.insert(name) {
                return Err(Error::Agent(format!(
                    "agent '{}' has duplicate tool or managed agent name '{name}'",
                    self.name
                )));
            }
        }
        for sub in &self.managed_agents {
            sub.validate()?;
        }
        Ok(())
    }

    /// Looks up a managed agent by name.
    pub(crate) fn find_managed(&self, name: &str) -> Option<&Agent> {
        self.managed_agents.iter().find(|a| a.name == name)
    }

    /// Looks up a tool by name.
    pub(crate) fn find_tool(&self, name: &str) -> Option<&BoxedTool> {
        self.tools.iter().find(|t| t.name() == name)
    }
}

/// Extracts the required `task` argument of a delegation call.
pub(crate) fn delegation_task(args: &Value) -> Option<&str> {
    args.get("task").and_then(Value::as_str)
}
