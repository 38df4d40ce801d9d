//! Grouped report output for LLM consumption.
//!
//! Builds an in-memory view of the store grouped by file and by kind,
//! with one-line signatures instead of full bodies, and renders it in
//! three markdown layouts.

use std::collections::BTreeMap;

use crate::element::{CodeElement, ElementKind};
use crate::index::{ContentIndex, IndexError};

/// A condensed element entry used in reports.
#[derive(Debug, Clone)]
pub struct RagEntry {
    pub kind: ElementKind,
    pub name: String,
    pub file: String,
    pub line: usize,
    pub signature: String,
    pub docstring: String,
}

/// The store contents grouped for report rendering.
#[derive(Debug)]
pub struct RagIndex {
    /// Markdown summary with per-kind and per-file counts
    pub summary: String,
    pub total_elements: usize,
    /// Entries per file, sorted by line
    pub by_file: BTreeMap<String, Vec<RagEntry>>,
    /// Entries per kind, sorted by name
    pub by_kind: BTreeMap<ElementKind, Vec<RagEntry>>,
}

impl RagIndex {
    /// Group everything currently in the store.
    pub fn build(index: &ContentIndex) -> Result<Self, IndexError> {
        let elements = index.read_all()?;

        let mut by_file: BTreeMap<String, Vec<RagEntry>> = BTreeMap::new();
        let mut by_kind: BTreeMap<ElementKind, Vec<RagEntry>> = BTreeMap::new();

        for element in &elements {
            let entry = RagEntry {
                kind: element.kind,
                name: element.name.clone(),
                file: element.file.clone(),
                line: element.start_line,
                signature: build_signature(element),
                docstring: element.docstring.clone(),
            };
            by_file
                .entry(element.file.clone())
                .or_default()
                .push(entry.clone());
            by_kind.entry(element.kind).or_default().push(entry);
        }

        for entries in by_file.values_mut() {
            entries.sort_by_key(|entry| entry.line);
        }
        for entries in by_kind.values_mut() {
            entries.sort_by(|a, b| a.name.cmp(&b.name));
        }

        let mut rag = Self {
            summary: String::new(),
            total_elements: elements.len(),
            by_file,
            by_kind,
        };
        rag.summary = rag.render_summary();
        Ok(rag)
    }

    fn render_summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "# Codebase Index - {} elements\n\n",
            self.total_elements
        ));

        out.push_str("## By Kind\n");
        for (kind, entries) in &self.by_kind {
            out.push_str(&format!("- {}: {}\n", kind.as_str(), entries.len()));
        }
        out.push('\n');

        out.push_str("## By File\n");
        for (file, entries) in &self.by_file {
            out.push_str(&format!("- {}: {} elements\n", file, entries.len()));
        }

        out
    }

    /// Full report grouped by file, elements in line order.
    pub fn format_by_file(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.summary);
        out.push_str("\n---\n\n");

        for (file, entries) in &self.by_file {
            out.push_str(&format!("## File: {} ({} elements)\n\n", file, entries.len()));
            for entry in entries {
                out.push_str(&format!("### {} {}\n", entry.kind.as_str(), entry.name));
                push_entry_details(&mut out, entry);
            }
        }

        out
    }

    /// Full report grouped by kind, elements in name order.
    pub fn format_by_kind(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.summary);
        out.push_str("\n---\n\n");

        for (kind, entries) in &self.by_kind {
            out.push_str(&format!("## {} ({})\n\n", kind.as_str(), entries.len()));
            for entry in entries {
                out.push_str(&format!("### {}\n", entry.name));
                push_entry_details(&mut out, entry);
            }
        }

        out
    }

    /// One line per element, grouped by kind.
    pub fn format_compact(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "# Available Code Elements ({} total)\n\n",
            self.total_elements
        ));

        for (kind, entries) in &self.by_kind {
            out.push_str(&format!("\n## {}\n\n", kind.as_str()));
            for entry in entries {
                out.push_str(&format!(
                    "- `{}` - {}:{}\n",
                    entry.signature, entry.file, entry.line
                ));
            }
        }

        out
    }
}

fn push_entry_details(out: &mut String, entry: &RagEntry) {
    out.push_str(&format!("**Location:** {}:{}\n", entry.file, entry.line));
    out.push_str(&format!("**Signature:** `{}`\n", entry.signature));
    if !entry.docstring.is_empty() {
        out.push_str(&format!("**Doc:** {}\n", entry.docstring.trim()));
    }
    out.push('\n');
}

/// One-line signature for an element.
///
/// Functions render `Name(a int, b int) returns`; structs and interfaces
/// render their name with a member count; plain types are just the name.
fn build_signature(element: &CodeElement) -> String {
    match element.kind {
        ElementKind::Function => {
            let params: Vec<String> = element
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
            let mut signature = format!("{}({})", element.name, params.join(", "));
            if !element.returns.is_empty() {
                signature.push(' ');
                signature.push_str(&element.returns);
            }
            signature
        }
        ElementKind::Struct => {
            if element.fields.is_empty() {
                element.name.clone()
            } else {
                format!("{} {{{} fields}}", element.name, element.fields.len())
            }
        }
        ElementKind::Interface => {
            if element.methods.is_empty() {
                element.name.clone()
            } else {
                format!("{} {{{} methods}}", element.name, element.methods.len())
            }
        }
        ElementKind::Class | ElementKind::Type | ElementKind::Variable => element.name.clone(),
    }
}
