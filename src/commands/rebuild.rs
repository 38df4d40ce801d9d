use anyhow::{Context, Result};
use std::env;

use crate::{Config, ContentIndex};

/// Run the rebuild command.
///
/// Rewrites the index file, collapsing records that share a content hash
/// down to the first occurrence.
pub fn run() -> Result<()> {
    let root = env::current_dir()?;
    let config = Config::load(&root)?;

    let index = ContentIndex::new(config.index_path(&root), config.indexer.dedup);
    index.init().context("failed to initialize index")?;

    println!("Rebuilding index...");
    let kept = index.rebuild().context("failed to rebuild index")?;

    println!("✓ Index rebuilt");
    println!("  Total elements: {kept}");

    Ok(())
}
