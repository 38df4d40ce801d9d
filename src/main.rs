use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use godex::cli::{Cli, Commands};
use godex::config::Config;
use godex::logging::init_logging;

fn main() -> Result<()> {
    // Determine project root (current directory)
    let project_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    // Load configuration (if available, otherwise use defaults)
    let config = Config::load(&project_root).unwrap_or_default();

    // Initialize logging with configuration
    // The guard MUST be held until program exit to ensure logs are flushed
    let _logging_guard = init_logging(&config.logging, &project_root)?;

    tracing::debug!("godex starting up");

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            godex::commands::init::run(force)?;
        }
        Commands::Index => {
            godex::commands::index::run()?;
        }
        Commands::Search { query, limit, kind } => {
            godex::commands::search::run(&query, limit, kind.as_deref())?;
        }
        Commands::Stats => {
            godex::commands::stats::run()?;
        }
        Commands::Rebuild => {
            godex::commands::rebuild::run()?;
        }
        Commands::Rag { format } => {
            godex::commands::rag::run(&format)?;
        }
    }

    Ok(())
}
