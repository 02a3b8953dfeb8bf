mod render;
mod seed;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use voxa_common::{CommandContext, CommandType, HandlerError, HandlerResponse};
use voxa_engine::config::ConfigLoader;
use voxa_engine::handler::{DomainHandler, HandlerRegistry};
use voxa_engine::memory::MemoryStore;
use voxa_engine::processor::CommandProcessor;

#[derive(Parser)]
#[command(name = "voxa", version, about = "Voxa command interpreter REPL")]
struct Args {
    /// User id for this session
    #[arg(long, default_value_t = 1)]
    user: i64,

    /// Session identifier
    #[arg(long, default_value = "local")]
    session: String,

    /// Current UI context, used for contextual help
    #[arg(long)]
    context: Option<String>,

    /// Config file (defaults to ./voxa.yaml, then ~/.voxa/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Demo handler standing in for the real domain services: it acknowledges
/// the command and echoes the structured parameters it received.
struct AckHandler;

#[async_trait]
impl DomainHandler for AckHandler {
    async fn handle(
        &self,
        _command: &str,
        command_type: CommandType,
        intent: Option<&str>,
        parameters: &HashMap<String, String>,
        _context: &CommandContext,
    ) -> Result<HandlerResponse, HandlerError> {
        let message = match command_type {
            CommandType::Navigation => format!(
                "Opening '{}'.",
                parameters.get("destination").map(String::as_str).unwrap_or("?")
            ),
            CommandType::PropertyAssessment => format!(
                "Running an assessment for property {}.",
                parameters.get("property_id").map(String::as_str).unwrap_or("?")
            ),
            CommandType::DataQuery => {
                let criteria = parameters.get("criteria").map(String::as_str).unwrap_or("");
                if criteria.is_empty() {
                    "Listing all properties.".to_string()
                } else {
                    format!("Listing properties matching '{}'.", criteria)
                }
            }
            CommandType::Workflow => format!(
                "Starting the '{}' workflow.",
                parameters.get("workflow_type").map(String::as_str).unwrap_or("?")
            ),
            CommandType::CodingAssistance => format!(
                "Coding assistance ({}) queued.",
                intent.unwrap_or("coding")
            ),
            CommandType::System => "Done.".to_string(),
        };
        Ok(HandlerResponse {
            result: serde_json::to_value(parameters).ok(),
            message: Some(message),
            suggestions: Vec::new(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log to stderr so stdout stays clean for REPL output.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ConfigLoader::load_from(path).await?,
        None => ConfigLoader::load_default().await?,
    };
    tracing::info!(
        threshold = config.processor.confidence_threshold,
        "configuration loaded"
    );

    let store = Arc::new(MemoryStore::new());
    seed::seed_demo_data(store.as_ref()).await?;

    let handler: Arc<dyn DomainHandler> = Arc::new(AckHandler);
    let mut handlers = HandlerRegistry::new();
    for command_type in [
        CommandType::Navigation,
        CommandType::PropertyAssessment,
        CommandType::DataQuery,
        CommandType::Workflow,
        CommandType::CodingAssistance,
    ] {
        handlers.register(command_type, handler.clone());
    }

    let processor = CommandProcessor::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store,
        handlers,
        config,
    );

    let mut context = CommandContext::new(args.user, args.session.clone());
    context.context_id = args.context.clone();

    run_repl(&processor, &context).await
}

async fn run_repl(processor: &CommandProcessor, context: &CommandContext) -> Result<()> {
    println!("Voxa ready. Try 'go to dashboard', 'show props' or 'help'.");
    println!("Type 'exit' or 'quit' to close.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut input = String::new();

    loop {
        print!("> ");
        stdout.flush()?;
        input.clear();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "exit" || trimmed == "quit" {
            break;
        }

        let result = processor.process(trimmed, context).await;
        println!("{}", render::render_result(&result));
    }

    println!("Session closed.");
    Ok(())
}
