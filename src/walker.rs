//! Filesystem walking for the index command.

use std::path::PathBuf;

use glob::Pattern;
use ignore::WalkBuilder;
use tracing::warn;

use crate::config::IndexerConfig;

/// A candidate file produced by the walker.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    /// Absolute (or root-joined) path for reading the file
    pub path: PathBuf,
    /// Path relative to the walk root, as recorded in the index
    pub relative_path: String,
}

/// Walks the tree respecting .gitignore and the configured patterns.
pub struct Walker {
    root: PathBuf,
    include: Vec<Pattern>,
    exclude: Vec<String>,
}

impl Walker {
    /// Create a new Walker with the given root directory and configuration.
    ///
    /// Invalid include globs are dropped with a warning; an empty include
    /// list matches every file.
    pub fn new(root: PathBuf, config: &IndexerConfig) -> Self {
        let include = config
            .include
            .iter()
            .filter_map(|pattern| match Pattern::new(pattern) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("ignoring invalid include pattern {pattern:?}: {e}");
                    None
                }
            })
            .collect();
        Self {
            root,
            include,
            exclude: config.exclude.clone(),
        }
    }

    /// Walk the directory tree and return an iterator of candidate files.
    ///
    /// This respects:
    /// - .gitignore files
    /// - Exclude patterns from config
    /// - Include globs matched against the file name
    pub fn walk(&self) -> impl Iterator<Item = ScannedFile> {
        let mut builder = WalkBuilder::new(&self.root);

        // Enable .gitignore support (enabled by default, but explicit)
        builder.git_ignore(true);
        builder.git_global(true);
        builder.git_exclude(true);

        // Add hidden file filtering (skip .git, etc.)
        builder.hidden(true);

        // Add exclude patterns using overrides
        let mut override_builder = ignore::overrides::OverrideBuilder::new(&self.root);
        for pattern in &self.exclude {
            // Negate pattern to ignore (! prefix means include, so we use !pattern to exclude)
            let _ = override_builder.add(&format!("!{}", pattern));
            let _ = override_builder.add(&format!("!{}/**", pattern));
        }

        if let Ok(overrides) = override_builder.build() {
            builder.overrides(overrides);
        }

        let include = self.include.clone();
        let exclude = self.exclude.clone();
        let root = self.root.clone();

        builder
            .build()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .map(move |entry| {
                let path = entry.into_path();
                let relative_path = match path.strip_prefix(&root) {
                    Ok(relative) => relative.to_string_lossy().into_owned(),
                    Err(_) => path.to_string_lossy().into_owned(),
                };
                ScannedFile {
                    path,
                    relative_path,
                }
            })
            .filter(move |file| {
                // Check if any exclude pattern matches the root-relative path
                !exclude
                    .iter()
                    .any(|pattern| file.relative_path.contains(pattern.as_str()))
            })
            .filter(move |file| {
                if include.is_empty() {
                    return true;
                }
                let Some(name) = file.path.file_name() else {
                    return false;
                };
                let name = name.to_string_lossy();
                include.iter().any(|pattern| pattern.matches(&name))
            })
    }

    /// Collect all walkable files into a Vec.
    pub fn collect_files(&self) -> Vec<ScannedFile> {
        self.walk().collect()
    }
}
