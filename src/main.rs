//! Plate Console
//!
//! Terminal front end for the license-plate violation management system.

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use mimalloc::MiMalloc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use plate_console::cli::{Cli, Command};
use plate_console::config::AppConfig;

mod commands;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let cli = Cli::parse();

    // Initialize tracing (M-LOG-STRUCTURED). Logs go to stderr so command
    // output stays pipeable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if cli.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }

    let config = AppConfig::from_cli(&cli).context("Failed to load configuration")?;

    tracing::info!(
        name: "console.config.loaded",
        base_url = %config.server.base_url,
        state_file = %config.storage.state_file,
        "Configuration loaded"
    );

    let console = commands::Console::connect(config)?;
    console.run(cli.command.unwrap_or(Command::Whoami)).await
}
