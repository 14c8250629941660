//! PubMed → Notion literature sync.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod entities;
mod error;
mod sources;
mod sync;
mod transform;
mod utils;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("litsync=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    if let Err(err) = cli::execute(cli).await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
