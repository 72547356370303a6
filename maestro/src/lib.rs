//! Hierarchical tool-calling agents on top of OpenAI-compatible chat APIs.
//!
//! An agent is a model plus a set of tools. The [`Runner`] drives the
//! reasoning loop: the model either answers in plain text (ending the
//! run) or requests tool calls, whose results are fed back as
//! observations for the next step. Agents can manage other agents,
//! which appear to the parent's model as ordinary tools taking a
//! `task` argument.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use maestro::llms::OpenAI;
//! use maestro::tools::{VisitWebpage, WebSearch};
//! use maestro::{Agent, RunConfig, Runner};
//!
//! # async fn demo() -> maestro::Result<()> {
//! let provider = Arc::new(OpenAI::from_env()?);
//!
//! let search_agent = Agent::new("search_agent")
//!     .description("Runs web searches and reads pages to answer research questions.")
//!     .model("gpt-4o-mini")
//!     .provider(provider.clone())
//!     .tool(WebSearch::new())
//!     .tool(VisitWebpage::new());
//!
//! let manager = Agent::new("manager")
//!     .model("gpt-4o")
//!     .provider(provider)
//!     .managed_agent(search_agent);
//!
//! let result = Runner::run(&manager, "What is the population of Reykjavik?", RunConfig::default()).await?;
//! println!("{}", result.output);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod chat;
pub mod error;
pub mod llms;
pub mod message;
pub mod tool;
pub mod tools;
pub mod usage;

pub mod prelude;

pub use agent::{Agent, DEFAULT_MAX_STEPS, RunConfig, RunResult, Runner, StepInfo, ToolCallRecord};
pub use chat::{ChatProvider, ChatRequest, ChatResponse, SharedChatProvider, StopReason, ToolChoice};
pub use error::{Error, LlmError, LlmErrorKind, Result, ToolError};
pub use message::{FunctionCall, Message, Role, ToolCall};
pub use tool::{BoxedTool, DynTool, Tool, ToolDefinition};
pub use usage::Usage;
