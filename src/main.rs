use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use chatbox::controller::ChatController;
use chatbox::prompt::cliclack::CliclackPrompt;
use chatbox::providers::configs::{GeminiProviderConfig, ProviderConfig};
use chatbox::providers::gemini::GeminiProvider;
use chatbox::session::Session;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Gemini API key (can also be set via GEMINI_API_KEY at runtime or build time)
    #[arg(long)]
    api_key: Option<String>,

    /// Model to use (defaults to GEMINI_MODEL or gemini-2.0-flash)
    #[arg(short, long)]
    model: Option<String>,

    /// API host (defaults to GEMINI_API_HOST or the public endpoint)
    #[arg(long)]
    host: Option<String>,

    /// Ask a single question and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = GeminiProviderConfig::from_env()?
        .with_api_key(cli.api_key)
        .with_host(cli.host)
        .with_model(cli.model);
    if config.api_key.is_none() {
        warn!("no API key configured, set GEMINI_API_KEY or pass --api-key");
    }
    debug!(?config, "provider configured");

    let provider = GeminiProvider::new(config).context("Failed to build HTTP client")?;
    let controller = ChatController::new(Box::new(provider));
    controller.subscribe(|snapshot| {
        debug!(
            turns = snapshot.conversation.len(),
            busy = snapshot.busy,
            "chat state changed"
        );
    });

    let mut session = Session::new(controller, Box::new(CliclackPrompt::new()));
    match cli.prompt {
        Some(message) => session.headless_start(&message).await,
        None => session.start().await,
    }
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "chatbox=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
