// CourseSync - Smart Deadline & Workload Balancer
// Main entry point

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

use coursesync::agent::CourseSyncAgent;
use coursesync::cli::{render, run_command, CliApp, Cli, Command};
use coursesync::config::{load_config, Config};
use coursesync::errors::api_key_missing_error;
use coursesync::notify::OutboxNotifier;
use coursesync::providers::{LlmProvider, OpenAIProvider, UnconfiguredProvider};
use coursesync::scrape::FallbackScraper;
use coursesync::server::{self, AppContext};
use coursesync::state::StateStore;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config()?;
    let agent = build_agent(&config)?;
    let store = StateStore::new(config.data_dir.clone());

    match cli.command.unwrap_or(Command::Menu) {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.bind_address.clone());
            let state = Arc::new(RwLock::new(store.load()?));
            let notifier = Arc::new(OutboxNotifier::new(store.data_dir()));
            let ctx = Arc::new(AppContext::new(Arc::new(agent), store, state));
            server::serve(ctx, &bind, notifier).await
        }
        command => {
            let mut app = CliApp::new(agent, store)?;
            if let Err(e) = run_command(command, &mut app).await {
                eprintln!("{}", render::failure(&format!("{:#}", e)));
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

/// Logs go to stderr so command output stays clean. `RUST_LOG` overrides.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("coursesync=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_agent(config: &Config) -> Result<CourseSyncAgent> {
    let provider: Arc<dyn LlmProvider> = if config.has_groq_key() {
        Arc::new(OpenAIProvider::from_config(&config.groq)?)
    } else {
        tracing::warn!("GROQ_API_KEY not set; AI features are disabled until it is");
        Arc::new(UnconfiguredProvider::new(api_key_missing_error()))
    };

    let scraper = FallbackScraper::from_config(&config.scraper, config.groq.timeout_seconds)?;

    Ok(CourseSyncAgent::new(provider, Arc::new(scraper)))
}
