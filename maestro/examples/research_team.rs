//! A manager agent delegating research to a web-search sub-agent.
//!
//! The manager has no tools of its own; the search agent is exposed to
//! its model as a tool taking a `task` argument.
//!
//! ```sh
//! OPENAI_API_KEY=sk-... cargo run --example research_team
//! ```

use std::sync::Arc;

use maestro::llms::OpenAI;
use maestro::tools::{VisitWebpage, WebSearch};
use maestro::{Agent, RunConfig, Runner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maestro=info".into()),
        )
        .init();

    let provider = Arc::new(OpenAI::from_env()?);
    let model = provider.model().to_string();

    let search_agent = Agent::new("search_agent")
        .description("Runs web searches and reads webpages to answer research questions with sourced facts.")
        .instructions("You are a web research specialist. Search, read the most relevant results, and report the facts you found with their sources.")
        .model(model.clone())
        .provider(provider.clone())
        .tool(WebSearch::new())
        .tool(VisitWebpage::new());

    let manager = Agent::new("manager")
        .instructions("You solve tasks by delegating research to your team and doing the final reasoning yourself.")
        .model(model)
        .provider(provider)
        .managed_agent(search_agent);

    let result = Runner::run(
        &manager,
        "If the US keeps its 2024 growth rate, how many years would it take for the GDP to double?",
        RunConfig::default(),
    )
    .await?;

    println!("\n{}", result.output);
    println!(
        "\n({} steps, {} tokens)",
        result.steps, result.usage.total_tokens
    );
    Ok(())
}
