//! Example running the reason+act loop against Gemini with the arithmetic tools
//!
//! ## Requirements
//!
//! - GEMINI_API_KEY environment variable must be set
//!
//! ## To run this example:
//! ```bash
//! export GEMINI_API_KEY=your_key_here
//! cargo run -p react-runtime --example arithmetic_agent
//! ```

use react_llm::providers::GeminiGateway;
use react_runtime::{LoopResult, ReactLoop};
use react_tools::default_registry;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let react_loop = ReactLoop::builder()
        .gateway(Arc::new(GeminiGateway::from_env()?))
        .registry(Arc::new(default_registry()?))
        .build()?;

    for query in [
        "How much is 5 + 33?",
        "How much is eleven plus fifty five times 5?",
    ] {
        println!("=== {query} ===");
        match react_loop.run(query).await? {
            LoopResult::Answer(answer) => println!("Result: {answer}\n"),
            LoopResult::Exhausted { message, .. } => println!("Gave up: {message}\n"),
        }
    }

    Ok(())
}
