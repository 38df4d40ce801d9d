//! Stats command implementation.
//!
//! Aggregates the index into per-kind, per-language and per-file counts.

use anyhow::Result;
use std::env;

use crate::{Config, ContentIndex};

pub fn run() -> Result<()> {
    let root = env::current_dir()?;
    let config = Config::load(&root)?;

    let index = ContentIndex::new(config.index_path(&root), config.indexer.dedup);
    let stats = index.stats()?;

    println!("godex index statistics\n");
    println!("Total elements: {}", stats.total_elements);
    println!(
        "Total body size: {:.2} KB\n",
        stats.total_body_bytes as f64 / 1024.0
    );

    println!("By kind:");
    for (kind, count) in &stats.by_kind {
        println!("  {}: {}", kind.as_str(), count);
    }

    println!("\nBy language:");
    for (language, count) in &stats.by_language {
        println!("  {language}: {count}");
    }

    println!("\nTop files:");
    let mut files: Vec<(&String, &usize)> = stats.by_file.iter().collect();
    files.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (file, count) in files.into_iter().take(10) {
        println!("  {file}: {count} elements");
    }

    Ok(())
}
