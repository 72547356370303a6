//! End-to-end reasoning-loop tests against the scripted mock provider.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};

use maestro::llms::MockProvider;
use maestro::{
    Agent, ChatResponse, Error, Message, Role, RunConfig, Runner, Tool, ToolCall, ToolError, Usage,
};

/// Tool that answers every call with a fixed string.
struct FixedTool {
    name: &'static str,
    reply: &'static str,
}

#[derive(Deserialize)]
struct FixedArgs {
    #[serde(default)]
    #[allow(dead_code)]
    query: String,
}

impl Tool for FixedTool {
    type Args = FixedArgs;
    type Output = String;
    type Error = ToolError;

    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Returns a canned reply."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"query": {"type": "string"}},
        })
    }

    async fn call(&self, _args: FixedArgs) -> Result<String, ToolError> {
        Ok(self.reply.to_string())
    }
}

/// Tool that always fails, standing in for an unreachable backend.
struct BrokenTool;

impl Tool for BrokenTool {
    type Args = FixedArgs;
    type Output = String;
    type Error = ToolError;

    fn name(&self) -> &str {
        "flaky_search"
    }

    fn description(&self) -> &str {
        "A search backend that is down."
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"query": {"type": "string"}}})
    }

    async fn call(&self, _args: FixedArgs) -> Result<String, ToolError> {
        Err(ToolError::Execution("connection refused".to_string()))
    }
}

fn tool_call_response(name: &str, args: Value) -> ChatResponse {
    ChatResponse::from_tool_calls(vec![ToolCall::function("call_1", name, args.to_string())])
}

#[tokio::test]
async fn immediate_answer_makes_one_call_and_no_tool_use() {
    let provider = Arc::new(MockProvider::with_text("The answer is 4."));
    let agent = Agent::new("solver")
        .model("test-model")
        .provider(provider.clone())
        .tool(FixedTool {
            name: "web_search",
            reply: "unused",
        });

    let result = Runner::run(&agent, "What is 2+2?", RunConfig::default())
        .await
        .unwrap();

    assert_eq!(result.output, "The answer is 4.");
    assert_eq!(result.steps, 1);
    assert_eq!(provider.call_count(), 1);
    assert!(result.step_history[0].tool_calls.is_empty());
    assert!(result.messages.iter().all(|m| m.role != Role::Tool));
}

#[tokio::test]
async fn agent_run_shorthand_matches_runner() {
    let agent = Agent::new("direct")
        .model("test-model")
        .provider(Arc::new(MockProvider::with_text("hi")));
    let result = agent.run("hello", RunConfig::default()).await.unwrap();
    assert_eq!(result.output, "hi");
    assert_eq!(result.agent_name, "direct");
}

#[tokio::test]
async fn tool_result_precedes_final_answer() {
    let provider = Arc::new(MockProvider::new(vec![
        tool_call_response("web_search", json!({"query": "US GDP 2024"})),
        ChatResponse::from_text("GDP grew 2.8% in 2024."),
    ]));
    let agent = Agent::new("researcher")
        .model("test-model")
        .provider(provider.clone())
        .tool(FixedTool {
            name: "web_search",
            reply: "US GDP grew 2.8% in 2024 per BEA.",
        });

    let result = Runner::run(&agent, "How fast did US GDP grow in 2024?", RunConfig::default())
        .await
        .unwrap();

    assert_eq!(result.steps, 2);
    assert_eq!(provider.call_count(), 2);

    // The second request must contain the tool observation right after
    // the assistant's tool-call message.
    let second = &provider.requests()[1];
    let tool_pos = second
        .messages
        .iter()
        .position(|m| m.role == Role::Tool)
        .unwrap();
    assert_eq!(second.messages[tool_pos - 1].role, Role::Assistant);
    assert!(second.messages[tool_pos].text().contains("per BEA"));
    assert_eq!(second.messages[tool_pos].tool_call_id.as_deref(), Some("call_1"));

    let record = &result.step_history[0].tool_calls[0];
    assert!(record.success);
    assert_eq!(record.name, "web_search");
}

#[tokio::test]
async fn step_limit_makes_exactly_max_steps_calls() {
    // Always asks for another tool call; can never finish.
    let provider = Arc::new(MockProvider::new(vec![tool_call_response(
        "web_search",
        json!({"query": "more"}),
    )]));
    let agent = Agent::new("loops")
        .model("test-model")
        .provider(provider.clone())
        .tool(FixedTool {
            name: "web_search",
            reply: "nothing new",
        })
        .max_steps(3);

    let err = Runner::run(&agent, "impossible task", RunConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MaxSteps { max_steps: 3 }));
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn run_config_overrides_agent_step_limit() {
    let provider = Arc::new(MockProvider::new(vec![tool_call_response(
        "web_search",
        json!({"query": "more"}),
    )]));
    let agent = Agent::new("loops")
        .model("test-model")
        .provider(provider.clone())
        .tool(FixedTool {
            name: "web_search",
            reply: "nothing new",
        })
        .max_steps(9);

    let err = Runner::run(&agent, "impossible", RunConfig::default().with_max_steps(2))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MaxSteps { max_steps: 2 }));
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn manager_delegates_to_sub_agent_by_name() {
    let child_provider = Arc::new(MockProvider::with_text(
        "Reykjavik has about 140,000 inhabitants.",
    ));
    let search_agent = Agent::new("search_agent")
        .description("Answers research questions using the web.")
        .model("test-model")
        .provider(child_provider.clone())
        .tool(FixedTool {
            name: "web_search",
            reply: "unused",
        });

    let manager_provider = Arc::new(MockProvider::new(vec![
        tool_call_response("search_agent", json!({"task": "Find the population of Reykjavik"})),
        ChatResponse::from_text("Around 140,000 people live in Reykjavik."),
    ]));
    let manager = Agent::new("manager")
        .model("test-model")
        .provider(manager_provider.clone())
        .managed_agent(search_agent);

    let result = Runner::run(&manager, "Population of Reykjavik?", RunConfig::default())
        .await
        .unwrap();

    assert_eq!(result.output, "Around 140,000 people live in Reykjavik.");

    // The manager's model was offered the sub-agent as a tool.
    let first = &manager_provider.requests()[0];
    assert!(first.tools.iter().any(|t| t.name == "search_agent"));

    // The child ran as its own conversation seeded with the task.
    let child_request = &child_provider.requests()[0];
    let user_turn = child_request
        .messages
        .iter()
        .find(|m| m.role == Role::User)
        .unwrap();
    assert_eq!(user_turn.text(), "Find the population of Reykjavik");

    // The child's answer came back to the manager as a tool observation.
    let second = &manager_provider.requests()[1];
    let observation = second.messages.iter().find(|m| m.role == Role::Tool).unwrap();
    assert!(observation.text().contains("140,000"));
}

#[tokio::test]
async fn delegation_without_task_is_reported_to_the_model() {
    let search_agent = Agent::new("search_agent")
        .model("test-model")
        .provider(Arc::new(MockProvider::with_text("unused")));

    let provider = Arc::new(MockProvider::new(vec![
        tool_call_response("search_agent", json!({"question": "oops"})),
        ChatResponse::from_text("recovered"),
    ]));
    let manager = Agent::new("manager")
        .model("test-model")
        .provider(provider.clone())
        .managed_agent(search_agent);

    let result = Runner::run(&manager, "do a thing", RunConfig::default())
        .await
        .unwrap();

    assert_eq!(result.output, "recovered");
    let record = &result.step_history[0].tool_calls[0];
    assert!(!record.success);
    assert!(record.result.contains("'task'"));
}

#[tokio::test]
async fn tool_failure_becomes_observation_and_run_continues() {
    let provider = Arc::new(MockProvider::new(vec![
        tool_call_response("flaky_search", json!({"query": "anything"})),
        ChatResponse::from_text("I could not reach the search backend."),
    ]));
    let agent = Agent::new("resilient")
        .model("test-model")
        .provider(provider.clone())
        .tool(BrokenTool);

    let result = Runner::run(&agent, "search something", RunConfig::default())
        .await
        .unwrap();

    assert_eq!(result.output, "I could not reach the search backend.");
    let record = &result.step_history[0].tool_calls[0];
    assert!(!record.success);
    assert!(record.result.contains("connection refused"));

    // The failure was fed back to the model, not surfaced to the caller.
    let second = &provider.requests()[1];
    let observation = second.messages.iter().find(|m| m.role == Role::Tool).unwrap();
    assert!(observation.text().contains("connection refused"));
}

#[tokio::test]
async fn unknown_tool_name_becomes_observation() {
    let provider = Arc::new(MockProvider::new(vec![
        tool_call_response("calculator", json!({"expr": "2+2"})),
        ChatResponse::from_text("done"),
    ]));
    let agent = Agent::new("limited")
        .model("test-model")
        .provider(provider.clone())
        .tool(FixedTool {
            name: "web_search",
            reply: "unused",
        });

    let result = Runner::run(&agent, "compute 2+2", RunConfig::default())
        .await
        .unwrap();

    assert_eq!(result.output, "done");
    let record = &result.step_history[0].tool_calls[0];
    assert!(!record.success);
    assert!(record.result.contains("not found"));
}

#[tokio::test]
async fn duplicate_names_fail_before_any_provider_call() {
    let provider = Arc::new(MockProvider::with_text("never reached"));
    let agent = Agent::new("broken")
        .model("test-model")
        .provider(provider.clone())
        .tool(FixedTool {
            name: "web_search",
            reply: "a",
        })
        .tool(FixedTool {
            name: "web_search",
            reply: "b",
        });

    let err = Runner::run(&agent, "anything", RunConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Agent(_)));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn missing_provider_is_a_config_error() {
    let agent = Agent::new("unwired").model("test-model");
    let err = Runner::run(&agent, "anything", RunConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Agent(_)));
}

#[tokio::test]
async fn provider_failure_terminates_the_run() {
    let provider = Arc::new(MockProvider::failing(maestro::LlmErrorKind::Network));
    let agent = Agent::new("offline").model("test-model").provider(provider);

    let err = Runner::run(&agent, "anything", RunConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Llm(_)));
}

#[tokio::test]
async fn usage_accumulates_across_steps() {
    let provider = Arc::new(MockProvider::new(vec![
        tool_call_response("web_search", json!({"query": "q"})).with_usage(Usage::new(100, 10)),
        ChatResponse::from_text("final").with_usage(Usage::new(150, 20)),
    ]));
    let agent = Agent::new("counter")
        .model("test-model")
        .provider(provider)
        .tool(FixedTool {
            name: "web_search",
            reply: "hit",
        });

    let result = Runner::run(&agent, "q", RunConfig::default()).await.unwrap();
    assert_eq!(result.usage.prompt_tokens, 250);
    assert_eq!(result.usage.completion_tokens, 30);
    assert_eq!(result.usage.total_tokens, 280);
}

#[tokio::test]
async fn final_conversation_is_complete_and_ordered() {
    let provider = Arc::new(MockProvider::new(vec![
        tool_call_response("web_search", json!({"query": "q"})),
        ChatResponse::from_text("final"),
    ]));
    let agent = Agent::new("ordered")
        .model("test-model")
        .provider(provider)
        .tool(FixedTool {
            name: "web_search",
            reply: "hit",
        });

    let result = Runner::run(&agent, "q", RunConfig::default()).await.unwrap();

    let roles: Vec<Role> = result.messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::System, Role::User, Role::Assistant, Role::Tool, Role::Assistant]
    );
    assert_eq!(result.messages.last().unwrap().text(), "final");
}

#[tokio::test]
async fn parallel_tool_calls_run_in_call_order() {
    let response = ChatResponse::from_tool_calls(vec![
        ToolCall::function("call_a", "first", json!({}).to_string()),
        ToolCall::function("call_b", "second", json!({}).to_string()),
    ]);
    let provider = Arc::new(MockProvider::new(vec![
        response,
        ChatResponse::from_text("done"),
    ]));
    let agent = Agent::new("multi")
        .model("test-model")
        .provider(provider.clone())
        .tool(FixedTool {
            name: "first",
            reply: "one",
        })
        .tool(FixedTool {
            name: "second",
            reply: "two",
        });

    let result = Runner::run(&agent, "go", RunConfig::default()).await.unwrap();

    let records = &result.step_history[0].tool_calls;
    assert_eq!(records[0].id, "call_a");
    assert_eq!(records[1].id, "call_b");

    let second_request = &provider.requests()[1];
    let observations: Vec<&Message> = second_request
        .messages
        .iter()
        .filter(|m| m.role == Role::Tool)
        .collect();
    assert_eq!(observations[0].tool_call_id.as_deref(), Some("call_a"));
    assert_eq!(observations[1].tool_call_id.as_deref(), Some("call_b"));
}
