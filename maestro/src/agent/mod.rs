//! Agents and the engine that runs them.
//!
//! An [`Agent`] is pure configuration: a name, instructions, a provider,
//! tools, and optionally a team of managed sub-agents. The stateless
//! [`Runner`] drives it through the reasoning loop and returns a
//! [`RunResult`].

mod config;
mod result;
mod runner;

pub use config::{Agent, DEFAULT_MAX_STEPS};
pub use result::{RunConfig, RunResult, StepInfo, ToolCallRecord};
pub use runner::Runner;
