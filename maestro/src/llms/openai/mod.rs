//! OpenAI-compatible chat completions provider.

mod client;
mod config;

pub use client::OpenAI;
pub use config::OpenAIConfig;
