use anyhow::{bail, Result};
use std::env;

use crate::{Config, ContentIndex, ElementKind};

/// Run the search command.
///
/// Matches the query as a case-insensitive substring of the element name
/// or body. Results keep store order and are truncated to `limit`.
pub fn run(query: &str, limit: usize, kind: Option<&str>) -> Result<()> {
    let root = env::current_dir()?;
    let config = Config::load(&root)?;

    let kind_filter = match kind {
        Some(value) => match ElementKind::parse(value) {
            Some(kind) => Some(kind),
            None => bail!("unknown element kind: {value}"),
        },
        None => None,
    };

    let index = ContentIndex::new(config.index_path(&root), config.indexer.dedup);

    let needle = query.to_lowercase();
    let mut results = index.search(|el| {
        let matches_query = el.name.to_lowercase().contains(&needle)
            || el.body.to_lowercase().contains(&needle);
        matches_query && kind_filter.map_or(true, |kind| el.kind == kind)
    })?;

    if results.is_empty() {
        println!("No results found for: {query}");
        println!("\nMake sure you have indexed the codebase with 'godex index'");
        return Ok(());
    }

    results.truncate(limit);

    println!("Found {} results for: \"{}\"\n", results.len(), query);

    for result in &results {
        println!("  {} {}", result.kind.as_str(), result.name);
        println!("    {}:{}", result.file, result.start_line);
        if !result.params.is_empty() {
            let params: Vec<String> = result
                .params
                .iter()
                .map(|p| {
                    if p.ty.is_empty() {
                        p.name.clone()
                    } else {
                        format!("{} {}", p.name, p.ty)
                    }
                })
                .collect();
            println!("    Parameters: {}", params.join(", "));
        }
        if !result.returns.is_empty() {
            println!("    Returns: {}", result.returns);
        }
        println!();
    }

    Ok(())
}
