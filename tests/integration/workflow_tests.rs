use anyhow::Result;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use godex::rag::RagIndex;
use godex::walker::Walker;
use godex::{Config, ContentIndex, ElementKind, GoExtractor};

/// Walk `root` with the given config, extract every supported file and
/// append the results, mirroring what the index command does.
fn index_project(root: &Path, config: &Config) -> Result<ContentIndex> {
    let walker = Walker::new(root.to_path_buf(), &config.indexer);
    let mut extractor = GoExtractor::new()?;
    let index = ContentIndex::new(config.index_path(root), config.indexer.dedup);
    index.init()?;

    for file in walker.collect_files() {
        if !extractor.supports_file(&file.relative_path) {
            continue;
        }
        let content = fs::read(&file.path)?;
        let extraction = extractor.extract(&file.relative_path, &content);
        index.append(&extraction.elements)?;
    }

    Ok(index)
}

#[test]
fn test_index_and_search_go_project() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();

    let main_content = r#"package main

import (
	"fmt"
	"strings"
)

// Add returns the sum of two integers.
func Add(a, b int) int {
	return a + b
}

type Server struct {
	Host string
	Port int
}

func (s *Server) Addr() string {
	return fmt.Sprintf("%s:%d", s.Host, s.Port)
}

func join(parts []string) string {
	return strings.Join(parts, ",")
}
"#;

    let util_content = r#"package util

// generateCommitMessage builds a one-line summary for a diff.
func generateCommitMessage(diff string) (string, error) {
	return "update: " + diff, nil
}
"#;

    fs::write(root.join("main.go"), main_content)?;
    fs::create_dir_all(root.join("pkg/util"))?;
    fs::write(root.join("pkg/util/strings.go"), util_content)?;
    fs::create_dir_all(root.join("vendor/dep"))?;
    fs::write(
        root.join("vendor/dep/dep.go"),
        "package dep\n\nfunc Vendored() {}\n",
    )?;
    fs::write(root.join("README.md"), "# sample\n")?;

    let config = Config::default();
    let index = index_project(root, &config)?;

    // Vendored code and non-Go files never reach the store
    let stats = index.stats()?;
    assert_eq!(stats.total_elements, 5);
    assert_eq!(stats.by_file.get("main.go"), Some(&4));
    assert_eq!(stats.by_file.get("pkg/util/strings.go"), Some(&1));
    assert!(stats.by_file.keys().all(|file| !file.starts_with("vendor")));
    assert_eq!(stats.by_kind.get(&ElementKind::Function), Some(&4));
    assert_eq!(stats.by_kind.get(&ElementKind::Struct), Some(&1));
    assert_eq!(stats.by_language.get("go"), Some(&5));

    // Substring search over names and bodies, case-insensitive
    let needle = "add";
    let results = index.search(|el| {
        el.name.to_lowercase().contains(needle) || el.body.to_lowercase().contains(needle)
    })?;
    let names: Vec<&str> = results.iter().map(|el| el.name.as_str()).collect();
    assert!(names.contains(&"Add"));
    assert!(names.contains(&"Server.Addr"));
    assert!(!names.contains(&"join"));

    let add = results.iter().find(|el| el.name == "Add").unwrap();
    assert_eq!(add.kind, ElementKind::Function);
    assert_eq!(add.returns, "int");
    assert_eq!(add.params.len(), 2);
    assert_eq!(add.params[0].name, "a");
    assert_eq!(add.params[0].ty, "int");
    assert_eq!(add.params[1].name, "b");
    assert_eq!(add.params[1].ty, "int");
    assert!(add.exported);
    assert_eq!(add.imports, vec!["fmt", "strings"]);
    assert!(add.docstring.contains("sum of two integers"));

    Ok(())
}

#[test]
fn test_search_matches_names_case_insensitively() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();

    let content = r#"package vcs

func generateQwenCommitMessage(diff string) string {
	return "qwen: " + diff
}

func generateClaudeCommitMessage(diff string) string {
	return "claude: " + diff
}

func generateSummary(diff string) string {
	return "summary"
}
"#;
    fs::write(root.join("commit.go"), content)?;

    let config = Config::default();
    let index = index_project(root, &config)?;

    // Mixed-case query, the way the search command normalizes it
    let needle = "CommitMessage".to_lowercase();
    let results = index.search(|el| {
        el.name.to_lowercase().contains(&needle) || el.body.to_lowercase().contains(&needle)
    })?;

    let names: Vec<&str> = results.iter().map(|el| el.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["generateQwenCommitMessage", "generateClaudeCommitMessage"]
    );

    Ok(())
}

#[test]
fn test_identical_bodies_across_files_index_once() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();

    let content = "package dup\n\nfunc helper() int {\n\treturn 1\n}\n";
    for i in 0..20 {
        fs::write(root.join(format!("file_{i:02}.go")), content)?;
    }

    let config = Config::default();
    let index = index_project(root, &config)?;

    let stats = index.stats()?;
    assert_eq!(
        stats.total_elements, 1,
        "identical bodies share a content hash and index once"
    );

    // Only one file gets the record attributed to it; per-file queries
    // for the other nineteen under-report by design
    let mut attributed = 0;
    for i in 0..20 {
        attributed += index.find_by_file(&format!("file_{i:02}.go"))?.len();
    }
    assert_eq!(attributed, 1);

    // Re-running the pipeline over unchanged files adds nothing
    let index = index_project(root, &config)?;
    assert_eq!(index.stats()?.total_elements, 1);

    Ok(())
}

#[test]
fn test_reindex_after_edit_appends_new_version() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    let source = root.join("calc.go");

    fs::write(
        &source,
        "package calc\n\nfunc Scale(v int) int {\n\treturn v * 2\n}\n",
    )?;
    let config = Config::default();
    index_project(root, &config)?;

    fs::write(
        &source,
        "package calc\n\nfunc Scale(v int) int {\n\treturn v * 4\n}\n",
    )?;
    let index = index_project(root, &config)?;

    let all = index.read_all()?;
    assert_eq!(all.len(), 2, "edited body is a new record, old one stays");
    assert_eq!(all[0].name, "Scale");
    assert_eq!(all[1].name, "Scale");
    assert_ne!(all[0].content_hash, all[1].content_hash);

    Ok(())
}

#[test]
fn test_rag_report_lists_indexed_elements() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();

    let content = r#"package app

// Add returns the sum of two integers.
func Add(a, b int) int {
	return a + b
}

type Server struct {
	Host string
	Port int
}

type Notifier interface {
	Notify(message string) error
}
"#;
    fs::write(root.join("app.go"), content)?;

    let config = Config::default();
    let index = index_project(root, &config)?;
    let rag = RagIndex::build(&index)?;

    let compact = rag.format_compact();
    assert!(compact.contains("# Available Code Elements (3 total)"));
    assert!(compact.contains("## function"));
    assert!(compact.contains("- `Add(a int, b int) int` - app.go:"));
    assert!(compact.contains("- `Server {2 fields}` - app.go:"));
    assert!(compact.contains("- `Notifier {1 methods}` - app.go:"));

    let by_file = rag.format_by_file();
    assert!(by_file.contains("## File: app.go (3 elements)"));
    assert!(by_file.contains("**Doc:** // Add returns the sum of two integers."));

    let by_kind = rag.format_by_kind();
    assert!(by_kind.contains("## function (1)"));
    assert!(by_kind.contains("### Add"));
    assert!(by_kind.contains("## struct (1)"));

    Ok(())
}

#[test]
fn test_saved_config_drives_index_location_and_dedup() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();

    let mut config = Config::default();
    config.indexer.dedup = false;
    config.save(root)?;
    assert!(Config::is_initialized(root));

    fs::write(
        root.join("a.go"),
        "package a\n\nfunc same() int {\n\treturn 1\n}\n",
    )?;
    fs::write(
        root.join("b.go"),
        "package b\n\nfunc same() int {\n\treturn 1\n}\n",
    )?;

    let loaded = Config::load(root)?;
    assert!(!loaded.indexer.dedup);

    let index = index_project(root, &loaded)?;
    assert_eq!(index.path(), root.join(".godex").join("codebase.jsonl"));
    assert_eq!(
        index.stats()?.total_elements,
        2,
        "dedup disabled keeps duplicate bodies"
    );

    Ok(())
}
