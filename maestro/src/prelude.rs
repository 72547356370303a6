//! One-line import for the common surface.
//!
//! ```ignore
//! use maestro::prelude::*;
//! ```

pub use crate::agent::{Agent, RunConfig, RunResult, Runner};
pub use crate::chat::{ChatProvider, ChatRequest, ChatResponse, SharedChatProvider};
pub use crate::error::{Error, Result, ToolError};
pub use crate::llms::{MockProvider, OpenAI, OpenAIConfig};
pub use crate::message::{Message, Role, ToolCall};
pub use crate::tool::{Tool, ToolDefinition};
pub use crate::tools::{VisitWebpage, WebSearch};
pub use crate::usage::Usage;
