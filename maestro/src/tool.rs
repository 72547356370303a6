//! The tool abstraction.
//!
//! Strongly-typed tools implement [`Tool`]; the agent stores them as
//! [`BoxedTool`]s behind the object-safe [`DynTool`] trait, which takes
//! raw JSON arguments and returns a string observation for the model.

use std::future::Future;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::ToolError;

/// A capability the model can invoke by name.
///
/// `Args` is deserialized from the model's JSON arguments; `Output` is
/// serialized back into the observation string (a bare `String` output
/// is passed through untouched).
pub trait Tool: Send + Sync {
    /// Argument type parsed from the model's JSON.
    type Args: DeserializeOwned + Send;
    /// Output type rendered back to the model.
    type Output: Serialize;
    /// Error type for failed invocations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Unique name the model uses to call this tool.
    fn name(&self) -> &str;

    /// What the tool does, shown to the model verbatim.
    fn description(&self) -> &str;

    /// JSON Schema describing `Args`.
    fn parameters_schema(&self) -> Value;

    /// Executes the tool.
    fn call(
        &self,
        args: Self::Args,
    ) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;
}

/// Object-safe form of [`Tool`], used by the agent at dispatch time.
pub trait DynTool: Send + Sync {
    /// Unique name the model uses to call this tool.
    fn name(&self) -> &str;

    /// What the tool does.
    fn description(&self) -> &str;

    /// JSON Schema for the arguments.
    fn parameters_schema(&self) -> Value;

    /// Parses `args`, runs the tool, and renders the output as a string.
    fn call_dyn(&self, args: Value) -> BoxFuture<'_, Result<String, ToolError>>;
}

impl<T: Tool> DynTool for T {
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn description(&self) -> &str {
        Tool::description(self)
    }

    fn parameters_schema(&self) -> Value {
        Tool::parameters_schema(self)
    }

    fn call_dyn(&self, args: Value) -> BoxFuture<'_, Result<String, ToolError>> {
        Box::pin(async move {
            let args: T::Args = serde_json::from_value(args)
                .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
            let output = self
                .call(args)
                .await
                .map_err(|e| ToolError::Execution(e.to_string()))?;
            render_output(&output)
        })
    }
}

/// Serializes a tool output for the model, unwrapping bare strings.
fn render_output<T: Serialize>(output: &T) -> Result<String, ToolError> {
    let value = serde_json::to_value(output)
        .map_err(|e| ToolError::Execution(format!("failed to serialize tool output: {e}")))?;
    match value {
        Value::String(s) => Ok(s),
        other => serde_json::to_string(&other)
            .map_err(|e| ToolError::Execution(format!("failed to serialize tool output: {e}"))),
    }
}

/// A heap-allocated tool as stored by the agent.
pub type BoxedTool = Box<dyn DynTool>;

/// A tool surface advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name.
    pub name: String,
    /// Description shown to the model.
    pub description: String,
    /// JSON Schema for the arguments.
    pub parameters: Value,
}

impl ToolDefinition {
    /// Builds the definition advertised for a tool.
    pub fn from_tool(tool: &dyn DynTool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            parameters: tool.parameters_schema(),
        }
    }

    /// OpenAI function-calling wire format.
    pub fn to_openai_value(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            },
        })
    }
}
