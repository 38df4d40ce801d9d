use anyhow::Result;
use std::env;

use crate::rag::RagIndex;
use crate::{Config, ContentIndex};

/// Run the rag command.
///
/// Prints the indexed elements as a markdown overview suitable for
/// pasting into an LLM context window. Unknown format names fall back
/// to the compact listing.
pub fn run(format: &str) -> Result<()> {
    let root = env::current_dir()?;
    let config = Config::load(&root)?;

    let index = ContentIndex::new(config.index_path(&root), config.indexer.dedup);
    let rag = RagIndex::build(&index)?;

    let output = match format {
        "file" => rag.format_by_file(),
        "kind" => rag.format_by_kind(),
        _ => rag.format_compact(),
    };

    println!("{output}");

    Ok(())
}
