use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "godex")]
#[command(author, version, about = "Structural Go code indexing and search")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize godex in the current directory
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Index the codebase into the element store
    Index,

    /// Search indexed elements by name or body content
    Search {
        /// Search query (case-insensitive substring)
        query: String,

        /// Maximum number of results to show
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Restrict results to one element kind
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Show index statistics
    Stats,

    /// Rewrite the store, collapsing duplicate records
    Rebuild,

    /// Print an LLM-ready report of the indexed elements
    Rag {
        /// Output format: compact, file, or kind
        #[arg(short, long, default_value = "compact")]
        format: String,
    },
}
