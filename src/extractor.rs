//! Structural extraction of Go declarations.
//!
//! Parses Go source with tree-sitter and walks the tree, turning function,
//! method, and type declarations into [`CodeElement`] records. Files that
//! fail to parse produce diagnostics instead of elements.

use std::path::Path;

use chrono::Utc;
use thiserror::Error;
use tracing::debug;
use tree_sitter::{Node, Parser, TreeCursor};

use crate::element::{hash_content, CodeElement, ElementKind, Param, LANGUAGE_GO};

/// Errors that can occur while setting up the extractor.
#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("failed to load Go grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
}

/// A non-fatal problem found while extracting one file.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
}

/// Everything extracted from a single file.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Elements in source order
    pub elements: Vec<CodeElement>,
    /// Problems that prevented full extraction
    pub diagnostics: Vec<Diagnostic>,
}

/// Go source extractor.
///
/// Owns its tree-sitter parser, so extraction takes `&mut self`. One
/// extractor instance is reused across all files of an indexing run.
pub struct GoExtractor {
    parser: Parser,
}

impl GoExtractor {
    pub fn new() -> Result<Self, ExtractorError> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_go::LANGUAGE.into())?;
        Ok(Self { parser })
    }

    /// Whether this extractor handles the given path.
    pub fn supports_file(&self, path: &str) -> bool {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == "go")
            .unwrap_or(false)
    }

    /// Extract all declarations from one file.
    ///
    /// A file with syntax errors contributes zero elements and a single
    /// diagnostic; the caller decides how loudly to report it.
    pub fn extract(&mut self, relative_path: &str, content: &[u8]) -> Extraction {
        let mut extraction = Extraction::default();

        let tree = match self.parser.parse(content, None) {
            Some(tree) => tree,
            None => {
                extraction.diagnostics.push(Diagnostic {
                    message: "file could not be parsed".to_string(),
                });
                return extraction;
            }
        };

        if tree.root_node().has_error() {
            debug!("skipping {relative_path}: parse tree contains errors");
            extraction.diagnostics.push(Diagnostic {
                message: "source contains syntax errors".to_string(),
            });
            return extraction;
        }

        let imports = self.collect_imports(&tree.root_node(), content);
        let mut cursor = tree.walk();
        self.visit(
            &mut cursor,
            relative_path,
            content,
            &imports,
            &mut extraction.elements,
        );

        extraction
    }

    /// Recursively walk the tree, collecting elements in source order.
    ///
    /// Recursion goes through declaration bodies too, so types declared
    /// inside function bodies are picked up.
    fn visit(
        &self,
        cursor: &mut TreeCursor,
        path: &str,
        source: &[u8],
        imports: &[String],
        elements: &mut Vec<CodeElement>,
    ) {
        let node = cursor.node();
        match node.kind() {
            "function_declaration" => {
                if let Some(element) = self.extract_function(&node, path, source, imports) {
                    elements.push(element);
                }
            }
            "method_declaration" => {
                if let Some(element) = self.extract_method(&node, path, source, imports) {
                    elements.push(element);
                }
            }
            "type_declaration" => self.extract_type_declaration(&node, path, source, elements),
            _ => {}
        }

        if cursor.goto_first_child() {
            loop {
                self.visit(cursor, path, source, imports, elements);
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
            cursor.goto_parent();
        }
    }

    /// Extract a top-level function declaration.
    fn extract_function(
        &self,
        node: &Node,
        path: &str,
        source: &[u8],
        imports: &[String],
    ) -> Option<CodeElement> {
        let name_node = node.child_by_field_name("name")?;
        let name = node_text(&name_node, source).to_string();
        let exported = is_exported(&name);
        Some(self.function_element(node, name, exported, path, source, imports))
    }

    /// Extract a method declaration, named `Receiver.Method`.
    ///
    /// The exported flag comes from the bare method name, not the
    /// receiver-qualified one.
    fn extract_method(
        &self,
        node: &Node,
        path: &str,
        source: &[u8],
        imports: &[String],
    ) -> Option<CodeElement> {
        let name_node = node.child_by_field_name("name")?;
        let method_name = node_text(&name_node, source);
        let exported = is_exported(method_name);
        let name = format!("{}.{}", self.receiver_base(node, source), method_name);
        Some(self.function_element(node, name, exported, path, source, imports))
    }

    /// Build the shared function/method record.
    fn function_element(
        &self,
        node: &Node,
        name: String,
        exported: bool,
        path: &str,
        source: &[u8],
        imports: &[String],
    ) -> CodeElement {
        let body = node_text(node, source).to_string();
        CodeElement {
            kind: ElementKind::Function,
            name,
            file: path.to_string(),
            start_line: node.start_position().row + 1,
            end_line: node.end_position().row + 1,
            params: self.extract_params(node.child_by_field_name("parameters"), source),
            returns: self.extract_returns(node.child_by_field_name("result"), source),
            fields: Vec::new(),
            methods: Vec::new(),
            extends: String::new(),
            implements: Vec::new(),
            content_hash: hash_content(&body),
            body,
            docstring: self.leading_docstring(node, source),
            imports: imports.to_vec(),
            exported,
            language: LANGUAGE_GO.to_string(),
            indexed_at: Utc::now(),
        }
    }

    /// Extract every spec of a `type (...)` declaration.
    ///
    /// All specs of a grouped declaration share the span, body, hash, and
    /// docstring of the whole declaration, matching how the declaration
    /// reads in source.
    fn extract_type_declaration(
        &self,
        decl: &Node,
        path: &str,
        source: &[u8],
        elements: &mut Vec<CodeElement>,
    ) {
        let body = node_text(decl, source).to_string();
        let content_hash = hash_content(&body);
        let docstring = self.leading_docstring(decl, source);
        let start_line = decl.start_position().row + 1;
        let end_line = decl.end_position().row + 1;

        let mut cursor = decl.walk();
        for spec in decl.children(&mut cursor) {
            if !matches!(spec.kind(), "type_spec" | "type_alias") {
                continue;
            }
            let Some(name_node) = spec.child_by_field_name("name") else {
                continue;
            };
            let name = node_text(&name_node, source).to_string();
            let exported = is_exported(&name);

            let (kind, fields, methods) = match spec.child_by_field_name("type") {
                Some(ty) if ty.kind() == "struct_type" => (
                    ElementKind::Struct,
                    self.struct_field_names(&ty, source),
                    Vec::new(),
                ),
                Some(ty) if ty.kind() == "interface_type" => (
                    ElementKind::Interface,
                    Vec::new(),
                    self.interface_method_names(&ty, source),
                ),
                _ => (ElementKind::Type, Vec::new(), Vec::new()),
            };

            elements.push(CodeElement {
                kind,
                name,
                file: path.to_string(),
                start_line,
                end_line,
                params: Vec::new(),
                returns: String::new(),
                fields,
                methods,
                extends: String::new(),
                implements: Vec::new(),
                body: body.clone(),
                content_hash: content_hash.clone(),
                docstring: docstring.clone(),
                imports: Vec::new(),
                exported,
                language: LANGUAGE_GO.to_string(),
                indexed_at: Utc::now(),
            });
        }
    }

    /// Collect named struct field names, in declaration order.
    ///
    /// Embedded fields have no name of their own and are skipped.
    fn struct_field_names(&self, struct_node: &Node, source: &[u8]) -> Vec<String> {
        let mut fields = Vec::new();
        let mut cursor = struct_node.walk();
        for child in struct_node.children(&mut cursor) {
            if child.kind() != "field_declaration_list" {
                continue;
            }
            let mut list_cursor = child.walk();
            for declaration in child.children(&mut list_cursor) {
                if declaration.kind() != "field_declaration" {
                    continue;
                }
                let mut names_cursor = declaration.walk();
                for name in declaration.children_by_field_name("name", &mut names_cursor) {
                    fields.push(node_text(&name, source).to_string());
                }
            }
        }
        fields
    }

    /// Collect interface method names, in declaration order.
    ///
    /// Embedded interfaces are type elements without a name field and are
    /// skipped. Older grammar versions wrap members in a method_spec_list.
    fn interface_method_names(&self, interface_node: &Node, source: &[u8]) -> Vec<String> {
        let mut methods = Vec::new();
        let mut cursor = interface_node.walk();
        for child in interface_node.children(&mut cursor) {
            match child.kind() {
                "method_elem" | "method_spec" => {
                    self.push_interface_method(&child, source, &mut methods)
                }
                "method_spec_list" => {
                    let mut list_cursor = child.walk();
                    for member in child.children(&mut list_cursor) {
                        if matches!(member.kind(), "method_elem" | "method_spec") {
                            self.push_interface_method(&member, source, &mut methods);
                        }
                    }
                }
                _ => {}
            }
        }
        methods
    }

    fn push_interface_method(&self, member: &Node, source: &[u8], methods: &mut Vec<String>) {
        if let Some(name) = member.child_by_field_name("name") {
            methods.push(node_text(&name, source).to_string());
        }
    }

    /// Extract parameters from a parameter_list node.
    ///
    /// A grouped declaration like `a, b int` yields one entry per name,
    /// each carrying the shared type. Unnamed parameters get `_`.
    fn extract_params(&self, list: Option<Node>, source: &[u8]) -> Vec<Param> {
        let Some(list) = list else {
            return Vec::new();
        };
        let mut params = Vec::new();
        let mut cursor = list.walk();
        for child in list.children(&mut cursor) {
            if !matches!(
                child.kind(),
                "parameter_declaration" | "variadic_parameter_declaration"
            ) {
                continue;
            }
            let ty = child
                .child_by_field_name("type")
                .map(|ty| self.render_type(&ty, source))
                .unwrap_or_else(|| "unknown".to_string());
            let mut names_cursor = child.walk();
            let names: Vec<String> = child
                .children_by_field_name("name", &mut names_cursor)
                .map(|name| node_text(&name, source).to_string())
                .collect();
            if names.is_empty() {
                params.push(Param {
                    name: "_".to_string(),
                    ty,
                });
            } else {
                for name in names {
                    params.push(Param {
                        name,
                        ty: ty.clone(),
                    });
                }
            }
        }
        params
    }

    /// Render the result clause of a function.
    ///
    /// No results gives an empty string, a single result gives the bare
    /// type, multiple results are parenthesized and comma-joined. Named
    /// results render as `name type`.
    fn extract_returns(&self, result: Option<Node>, source: &[u8]) -> String {
        let Some(result) = result else {
            return String::new();
        };
        if result.kind() != "parameter_list" {
            return self.render_type(&result, source);
        }

        let mut entries = Vec::new();
        let mut cursor = result.walk();
        for child in result.children(&mut cursor) {
            if child.kind() != "parameter_declaration" {
                continue;
            }
            let ty = child
                .child_by_field_name("type")
                .map(|ty| self.render_type(&ty, source))
                .unwrap_or_else(|| "unknown".to_string());
            let mut names_cursor = child.walk();
            let names: Vec<String> = child
                .children_by_field_name("name", &mut names_cursor)
                .map(|name| node_text(&name, source).to_string())
                .collect();
            if names.is_empty() {
                entries.push(ty);
            } else {
                for name in names {
                    entries.push(format!("{name} {ty}"));
                }
            }
        }

        match entries.as_slice() {
            [] => String::new(),
            [single] => single.clone(),
            _ => format!("({})", entries.join(", ")),
        }
    }

    /// Render a type expression into its display string.
    ///
    /// Only a closed set of shapes is rendered; anything else (channels,
    /// generics, inline structs) collapses to `unknown`.
    fn render_type(&self, node: &Node, source: &[u8]) -> String {
        match node.kind() {
            "type_identifier" | "identifier" | "package_identifier" => {
                node_text(node, source).to_string()
            }
            "pointer_type" => match node.named_child(0) {
                Some(inner) => format!("*{}", self.render_type(&inner, source)),
                None => "unknown".to_string(),
            },
            "slice_type" | "array_type" => match node.child_by_field_name("element") {
                Some(element) => format!("[]{}", self.render_type(&element, source)),
                None => "unknown".to_string(),
            },
            "map_type" => {
                match (
                    node.child_by_field_name("key"),
                    node.child_by_field_name("value"),
                ) {
                    (Some(key), Some(value)) => format!(
                        "map[{}]{}",
                        self.render_type(&key, source),
                        self.render_type(&value, source)
                    ),
                    _ => "unknown".to_string(),
                }
            }
            "qualified_type" => {
                match (
                    node.child_by_field_name("package"),
                    node.child_by_field_name("name"),
                ) {
                    (Some(package), Some(name)) => {
                        format!("{}.{}", node_text(&package, source), node_text(&name, source))
                    }
                    _ => "unknown".to_string(),
                }
            }
            "interface_type" => "interface{}".to_string(),
            "function_type" => "func".to_string(),
            _ => "unknown".to_string(),
        }
    }

    /// Base type name of a method receiver, with any pointer stripped.
    fn receiver_base(&self, node: &Node, source: &[u8]) -> String {
        let Some(receiver) = node.child_by_field_name("receiver") else {
            return "unknown".to_string();
        };
        let mut cursor = receiver.walk();
        for child in receiver.children(&mut cursor) {
            if child.kind() != "parameter_declaration" {
                continue;
            }
            if let Some(ty) = child.child_by_field_name("type") {
                return self.base_type_name(&ty, source);
            }
        }
        "unknown".to_string()
    }

    fn base_type_name(&self, node: &Node, source: &[u8]) -> String {
        match node.kind() {
            "type_identifier" => node_text(node, source).to_string(),
            "pointer_type" => match node.named_child(0) {
                Some(inner) => self.base_type_name(&inner, source),
                None => "unknown".to_string(),
            },
            _ => "unknown".to_string(),
        }
    }

    /// Comment block directly above a declaration, verbatim.
    ///
    /// Only comments stacked immediately above count; a blank line breaks
    /// the chain. Comment markers are kept as written.
    fn leading_docstring(&self, node: &Node, source: &[u8]) -> String {
        let mut docs: Vec<String> = Vec::new();
        let mut boundary_row = node.start_position().row;
        let mut prev = node.prev_sibling();

        while let Some(sibling) = prev {
            if sibling.kind() != "comment" || sibling.end_position().row + 1 < boundary_row {
                break;
            }
            docs.push(node_text(&sibling, source).to_string());
            boundary_row = sibling.start_position().row;
            prev = sibling.prev_sibling();
        }

        docs.reverse();
        docs.join("\n")
    }

    /// Collect import paths declared at the top of a file.
    fn collect_imports(&self, root: &Node, source: &[u8]) -> Vec<String> {
        let mut imports = Vec::new();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() != "import_declaration" {
                continue;
            }
            let mut decl_cursor = child.walk();
            for item in child.children(&mut decl_cursor) {
                match item.kind() {
                    "import_spec" => self.push_import_path(&item, source, &mut imports),
                    "import_spec_list" => {
                        let mut list_cursor = item.walk();
                        for spec in item.children(&mut list_cursor) {
                            if spec.kind() == "import_spec" {
                                self.push_import_path(&spec, source, &mut imports);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        imports
    }

    fn push_import_path(&self, spec: &Node, source: &[u8], imports: &mut Vec<String>) {
        if let Some(path) = spec.child_by_field_name("path") {
            imports.push(node_text(&path, source).trim_matches('"').to_string());
        }
    }
}

/// Whether a Go identifier is exported.
fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Text of a byte span in `source`. Degenerate or out-of-range spans and
/// invalid UTF-8 yield the empty string.
fn span_text(source: &[u8], start: usize, end: usize) -> &str {
    if start >= end {
        return "";
    }
    source
        .get(start..end)
        .and_then(|bytes| std::str::from_utf8(bytes).ok())
        .unwrap_or("")
}

/// Text content of a single node.
fn node_text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
    span_text(source, node.start_byte(), node.end_byte())
}
