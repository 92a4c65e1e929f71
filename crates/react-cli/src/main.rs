//! Command-line interface for react-agent-rs
//!
//! Commands:
//! - `query`: Answer a question through the reason+act loop
//! - `sum`: Call `sum_two_numbers` directly
//! - `multiply`: Call `multiply_two_numbers` directly
//! - `functions`: List the available tools
//! - `serve`: Start the HTTP API

use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use react_core::{ToolCallRequest, ToolSchema};
use react_llm::providers::{GeminiConfig, GeminiGateway};
use react_runtime::{LoopConfig, LoopResult, ReactLoop};
use react_server::AppState;
use react_tools::{ToolRegistry, default_registry};
use react_utils::{AppConfig, LogFormat, init_tracing};
use serde_json::json;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "react-cli")]
#[command(about = "Reason+act agent with arithmetic tools", long_about = None, version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Model identifier
    #[arg(long, global = true, env = "REACT_MODEL")]
    model: Option<String>,

    /// Iteration budget of one run
    #[arg(long, global = true, env = "REACT_MAX_ITERATIONS")]
    max_iterations: Option<usize>,

    /// Log output format (text or json)
    #[arg(long, global = true, env = "REACT_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a question through the reason+act loop
    Query {
        /// The question
        text: String,
    },

    /// Sum two integers without the model
    #[command(allow_negative_numbers = true)]
    Sum {
        /// First number
        x: i64,
        /// Second number
        y: i64,
    },

    /// Multiply two integers without the model
    #[command(allow_negative_numbers = true)]
    Multiply {
        /// First number
        x: i64,
        /// Second number
        y: i64,
    },

    /// List the available tools
    Functions,

    /// Start the HTTP API
    Serve {
        /// Override the bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

impl Cli {
    /// Overlay command-line flags on the environment configuration
    fn app_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = AppConfig::from_env()?;
        if let Some(model) = &self.model {
            config.model.clone_from(model);
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        if let Some(log_format) = self.log_format {
            config.log_format = log_format;
        }
        if let Commands::Serve { host, port } = &self.command {
            if let Some(host) = host {
                config.host.clone_from(host);
            }
            if let Some(port) = port {
                config.port = *port;
            }
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.app_config()?;
    init_tracing(config.log_format);

    info!(model = %config.model, max_iterations = config.max_iterations, "Starting react-cli");

    match cli.command {
        Commands::Query { text } => query(&config, text).await,
        Commands::Sum { x, y } => arithmetic(&default_registry()?, "sum_two_numbers", x, y).await,
        Commands::Multiply { x, y } => {
            arithmetic(&default_registry()?, "multiply_two_numbers", x, y).await
        }
        Commands::Functions => {
            println!("{}", functions_table(&default_registry()?.schemas()));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Serve { .. } => {
            let state = AppState::from_config(&config, gemini_gateway(&config)?)?;
            react_server::start(Arc::new(state), &config.bind_address()).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn gemini_gateway(config: &AppConfig) -> anyhow::Result<Arc<GeminiGateway>> {
    let mut gemini = GeminiConfig::from_env().context("GEMINI_API_KEY must be set")?;
    if config.gateway_timeout_secs > 0 {
        gemini = gemini.with_timeout(config.gateway_timeout_secs);
    }
    Ok(Arc::new(GeminiGateway::with_config(gemini)?))
}

async fn query(config: &AppConfig, text: String) -> anyhow::Result<ExitCode> {
    let loop_config = LoopConfig {
        max_iterations: config.max_iterations,
        model: config.model.clone(),
        gateway_timeout: config.gateway_timeout(),
        ..LoopConfig::default()
    };
    let agent = ReactLoop::new(
        gemini_gateway(config)?,
        Arc::new(default_registry()?),
        loop_config,
    )?;

    match agent.run(text).await? {
        LoopResult::Answer(answer) => {
            println!("{answer}");
            Ok(ExitCode::SUCCESS)
        }
        LoopResult::Exhausted { message, .. } => {
            eprintln!("{message}");
            Ok(ExitCode::from(2))
        }
    }
}

async fn arithmetic(registry: &ToolRegistry, tool: &str, x: i64, y: i64) -> anyhow::Result<ExitCode> {
    let result = registry
        .invoke(&ToolCallRequest::new(tool, json!({ "x": x, "y": y })))
        .await?;
    println!("{}", result.response["result"]);
    Ok(ExitCode::SUCCESS)
}

fn functions_table(schemas: &[ToolSchema]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Name", "Description", "Parameters"]);

    for schema in schemas {
        let parameters = schema
            .parameters
            .iter()
            .map(|p| {
                let marker = if p.required { "" } else { "?" };
                format!("{}{marker}: {}", p.name, p.ty.as_str())
            })
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![schema.name.clone(), schema.description.clone(), parameters]);
    }

    table
}
