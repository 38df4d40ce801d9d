use anyhow::Result;
use std::fs;
use tempfile::TempDir;

use godex::element::{hash_content, LANGUAGE_GO};
use godex::{CodeElement, ContentIndex, ElementKind, Param};

/// Helper to build a minimal function element around a body.
fn element(name: &str, body: &str, file: &str) -> CodeElement {
    CodeElement {
        kind: ElementKind::Function,
        name: name.to_string(),
        file: file.to_string(),
        start_line: 1,
        end_line: 3,
        params: Vec::new(),
        returns: String::new(),
        fields: Vec::new(),
        methods: Vec::new(),
        extends: String::new(),
        implements: Vec::new(),
        body: body.to_string(),
        content_hash: hash_content(body),
        docstring: String::new(),
        imports: Vec::new(),
        exported: false,
        language: LANGUAGE_GO.to_string(),
        indexed_at: chrono::Utc::now(),
    }
}

#[test]
fn test_records_are_one_json_object_per_line() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store_path = temp_dir.path().join("codebase.jsonl");
    let index = ContentIndex::new(&store_path, true);
    index.init()?;

    index.append(&[
        element("a", "func a() {}", "a.go"),
        element("b", "func b() {}", "b.go"),
        element("c", "func c() {}", "c.go"),
    ])?;

    let raw = fs::read_to_string(&store_path)?;
    assert!(raw.ends_with('\n'), "store should end with a newline");

    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), 3, "one line per record");
    for line in lines {
        let value: serde_json::Value = serde_json::from_str(line)?;
        assert!(value.is_object(), "each line is a JSON object");
    }

    Ok(())
}

#[test]
fn test_records_use_camel_case_keys() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store_path = temp_dir.path().join("codebase.jsonl");
    let index = ContentIndex::new(&store_path, true);
    index.init()?;
    index.append(&[element("a", "func a() {}", "a.go")])?;

    let raw = fs::read_to_string(&store_path)?;
    assert!(raw.contains("\"contentHash\""));
    assert!(raw.contains("\"startLine\""));
    assert!(raw.contains("\"endLine\""));
    assert!(raw.contains("\"indexedAt\""));
    assert!(!raw.contains("\"content_hash\""));
    assert!(!raw.contains("\"start_line\""));

    Ok(())
}

#[test]
fn test_append_preserves_existing_bytes() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store_path = temp_dir.path().join("codebase.jsonl");
    let index = ContentIndex::new(&store_path, true);
    index.init()?;

    index.append(&[element("first", "func first() {}", "a.go")])?;
    let before = fs::read(&store_path)?;

    index.append(&[element("second", "func second() {}", "b.go")])?;
    let after = fs::read(&store_path)?;

    assert!(after.len() > before.len());
    assert_eq!(&after[..before.len()], &before[..], "existing records are never rewritten");

    Ok(())
}

#[test]
fn test_duplicate_only_append_leaves_store_byte_identical() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store_path = temp_dir.path().join("codebase.jsonl");
    let index = ContentIndex::new(&store_path, true);
    index.init()?;

    let batch = vec![element("dup", "func dup() {}", "a.go")];
    index.append(&batch)?;
    let before = fs::read(&store_path)?;

    let appended = index.append(&batch)?;
    assert_eq!(appended, 0);

    let after = fs::read(&store_path)?;
    assert_eq!(after, before, "a no-op append must not touch the store");

    Ok(())
}

#[test]
fn test_appending_a_batch_twice_counts_once() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let index = ContentIndex::new(temp_dir.path().join("codebase.jsonl"), true);
    index.init()?;

    let batch: Vec<CodeElement> = (0..20)
        .map(|i| element(&format!("fn{i}"), &format!("func fn{i}() {{}}"), "gen.go"))
        .collect();

    assert_eq!(index.append(&batch)?, 20);
    assert_eq!(index.append(&batch)?, 0);
    assert_eq!(index.stats()?.total_elements, 20);

    Ok(())
}

#[test]
fn test_read_all_returns_written_records_field_for_field() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let index = ContentIndex::new(temp_dir.path().join("codebase.jsonl"), true);
    index.init()?;

    let mut add = element("Add", "func Add(a, b int) int {\n\treturn a + b\n}", "math.go");
    add.params = vec![
        Param {
            name: "a".to_string(),
            ty: "int".to_string(),
        },
        Param {
            name: "b".to_string(),
            ty: "int".to_string(),
        },
    ];
    add.returns = "int".to_string();
    add.docstring = "// Add returns the sum.".to_string();
    add.imports = vec!["fmt".to_string()];
    add.exported = true;

    let mut user = element("User", "type User struct {\n\tName string\n}", "user.go");
    user.kind = ElementKind::Struct;
    user.fields = vec!["Name".to_string()];
    user.exported = true;

    let sparse = element("helper", "func helper() {}", "util.go");

    let written = vec![add, user, sparse];
    index.append(&written)?;

    let read = index.read_all()?;
    assert_eq!(read, written);

    Ok(())
}

#[test]
fn test_rebuild_drops_garbage_lines() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store_path = temp_dir.path().join("codebase.jsonl");
    let index = ContentIndex::new(&store_path, true);
    index.init()?;

    index.append(&[element("a", "func a() {}", "a.go")])?;

    // Simulate a partial write from an interrupted indexing run
    let mut raw = fs::read_to_string(&store_path)?;
    raw.push_str("{\"kind\":\"function\",\"name\":\"trunc\n");
    fs::write(&store_path, raw)?;

    index.append(&[element("b", "func b() {}", "b.go")])?;

    let kept = index.rebuild()?;
    assert_eq!(kept, 2);

    let raw = fs::read_to_string(&store_path)?;
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        assert!(serde_json::from_str::<CodeElement>(line).is_ok());
    }

    Ok(())
}

#[test]
fn test_rebuild_keeps_first_occurrence_in_store_order() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store_path = temp_dir.path().join("codebase.jsonl");

    // Dedup off, so duplicate bodies land in the store
    let index = ContentIndex::new(&store_path, false);
    index.init()?;

    let body = "func shared() {}";
    index.append(&[
        element("original", body, "a.go"),
        element("other", "func other() {}", "b.go"),
        element("copy", body, "c.go"),
    ])?;
    assert_eq!(index.read_all()?.len(), 3);

    let kept = index.rebuild()?;
    assert_eq!(kept, 2);

    let survivors = index.read_all()?;
    let names: Vec<&str> = survivors.iter().map(|el| el.name.as_str()).collect();
    assert_eq!(names, vec!["original", "other"]);

    Ok(())
}
