//! A single agent with web tools.
//!
//! ```sh
//! OPENAI_API_KEY=sk-... cargo run --example agent_basic
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

    let agent = Agent::new("researcher")
        .instructions("You are a research assistant. Search the web when you need facts and cite the pages you used.")
        .model(model)
        .provider(provider)
        .tool(WebSearch::new())
        .tool(VisitWebpage::new());

    let result = Runner::run(
        &agent,
        "What is the tallest building completed in the last five years, and how tall is it?",
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
