//! Top-level CLI parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

pub mod health;

use crate::config::{self, Config};
use crate::error::LitSyncError;
use crate::sync::SyncEngine;

#[derive(Parser, Debug)]
#[command(
    name = "litsync",
    about = "Run PubMed literature queries and sync new articles into a Notion database",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON instead of Markdown
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every configured query and sync new articles
    Run {
        /// Queries file, one query per line; overrides LITSYNC_QUERIES_FILE
        #[arg(long)]
        queries: Option<PathBuf>,
    },
    /// Check external API connectivity
    Health,
    /// Show version
    Version,
}

pub async fn execute(cli: Cli) -> Result<(), LitSyncError> {
    match cli.command {
        Commands::Run { queries } => run_sync(queries, cli.json).await,
        Commands::Health => health::run(cli.json).await,
        Commands::Version => {
            println!("litsync {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run_sync(queries_override: Option<PathBuf>, json: bool) -> Result<(), LitSyncError> {
    let config = Config::from_env(queries_override)?;
    let queries = config::load_queries(&config.queries_path)?;
    if queries.is_empty() {
        info!(path = %config.queries_path.display(), "No queries configured; nothing to do");
        return Ok(());
    }

    let engine = SyncEngine::new(&config)?;
    let summary = engine.run(&queries).await;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).map_err(LitSyncError::Output)?
        );
    } else {
        print!("{}", summary.to_markdown());
    }
    Ok(())
}
