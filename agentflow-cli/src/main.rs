//! `agentflow` binary entry point.

mod cmd;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cmd::Cli;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // A missing .env file is fine; the environment may already be set.
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    cli.run().await
}
