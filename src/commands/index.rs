//! Index command implementation.
//!
//! Walks the project tree, extracts Go code elements from every matching
//! file and appends the new records to `.godex/codebase.jsonl`.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::fs;
use tracing::{debug, warn};

use crate::walker::Walker;
use crate::{Config, ContentIndex, GoExtractor};

pub fn run() -> Result<()> {
    let root = env::current_dir()?;
    let config = Config::load(&root)?;

    println!("Scanning files...");
    let walker = Walker::new(root.clone(), &config.indexer);
    let files = walker.collect_files();
    println!("Found {} files", files.len());

    let mut extractor = GoExtractor::new().context("failed to initialize Go extractor")?;
    let index = ContentIndex::new(config.index_path(&root), config.indexer.dedup);
    index.init().context("failed to initialize index")?;

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] Indexing: [{bar:40.cyan/blue}] {pos}/{len}",
            )
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut total_files = 0usize;
    let mut total_elements = 0usize;
    let mut files_with_diagnostics = 0usize;

    for file in &files {
        progress.inc(1);

        if !extractor.supports_file(&file.relative_path) {
            continue;
        }

        let content = match fs::read(&file.path) {
            Ok(content) => content,
            Err(err) => {
                warn!("cannot read {}: {}", file.relative_path, err);
                continue;
            }
        };

        let extraction = extractor.extract(&file.relative_path, &content);

        if !extraction.diagnostics.is_empty() {
            files_with_diagnostics += 1;
            for diagnostic in &extraction.diagnostics {
                warn!("{}: {}", file.relative_path, diagnostic.message);
            }
        }

        let indexed = index
            .append(&extraction.elements)
            .with_context(|| format!("failed to index {}", file.relative_path))?;

        debug!(
            "{}: {} extracted, {} indexed",
            file.relative_path,
            extraction.elements.len(),
            indexed
        );

        total_elements += indexed;
        total_files += 1;
    }

    progress.finish_and_clear();

    println!("✓ Indexing complete");
    println!("  Files processed: {total_files}");
    if files_with_diagnostics > 0 {
        println!("  Files with parse diagnostics: {files_with_diagnostics}");
    }
    println!("  Elements indexed: {total_elements}");

    Ok(())
}
