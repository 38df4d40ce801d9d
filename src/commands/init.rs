use anyhow::{bail, Result};
use std::env;
use tracing::info;

use crate::Config;

pub fn run(force: bool) -> Result<()> {
    let root = env::current_dir()?;

    if Config::is_initialized(&root) && !force {
        bail!(
            "godex is already initialized in {:?} (use --force to overwrite)",
            Config::godex_dir(&root)
        );
    }

    let config = Config::default();
    config.save(&root)?;

    info!("Initialized godex in {:?}", Config::godex_dir(&root));
    println!(
        "✓ Created {} with default configuration",
        Config::godex_dir(&root).display()
    );
    println!("\nNext steps:");
    println!("  1. Edit .godex/config.toml to customize include/exclude patterns");
    println!("  2. Run 'godex index' to index the codebase");
    println!("  3. Run 'godex search <query>' to find indexed elements");

    Ok(())
}
