//! Shared data model for indexed code elements.
//!
//! A [`CodeElement`] is one structural declaration pulled out of a source
//! file: a function, a method, or a named type. Elements are serialized as
//! one JSON object per line in the index store, so the wire shape here is
//! the on-disk record format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Language identifier attached to every element this indexer produces.
pub const LANGUAGE_GO: &str = "go";

/// Kinds of structural elements the extractor produces.
///
/// Variant order matches the wire strings alphabetically, so ordered
/// collections keyed by kind list groups the same way the reports do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// A class declaration; part of the record model, never produced
    /// by the Go extractor
    Class,
    /// A top-level function or a method (methods are named `Receiver.Name`)
    Function,
    /// An interface type declaration
    Interface,
    /// A struct type declaration
    Struct,
    /// Any other named type declaration (aliases, defined types)
    Type,
    /// A variable declaration; part of the record model, never produced
    /// by the Go extractor
    Variable,
}

impl ElementKind {
    /// Convert to the wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Class => "class",
            ElementKind::Function => "function",
            ElementKind::Interface => "interface",
            ElementKind::Struct => "struct",
            ElementKind::Type => "type",
            ElementKind::Variable => "variable",
        }
    }

    /// Parse from the wire string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "class" => Some(ElementKind::Class),
            "function" => Some(ElementKind::Function),
            "interface" => Some(ElementKind::Interface),
            "struct" => Some(ElementKind::Struct),
            "type" => Some(ElementKind::Type),
            "variable" => Some(ElementKind::Variable),
            _ => None,
        }
    }
}

/// A single named parameter of a function or method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name, `_` when the declaration leaves it unnamed
    pub name: String,
    /// Rendered type expression, `unknown` for shapes we do not render
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub ty: String,
}

/// One structural code element extracted from a source file.
///
/// Optional describing fields (`params`, `fields`, `docstring`, ...) are
/// omitted from the serialized record when empty, so function records never
/// carry struct baggage and vice versa. `body` and the locating fields are
/// always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeElement {
    /// What kind of declaration this is
    pub kind: ElementKind,
    /// Declared name; methods use `Receiver.Name`
    pub name: String,
    /// File path relative to the indexed root
    pub file: String,
    /// First line of the declaration (1-indexed)
    pub start_line: usize,
    /// Last line of the declaration (1-indexed)
    pub end_line: usize,
    /// Function/method parameters, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    /// Rendered return clause, empty for none
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub returns: String,
    /// Named struct field names, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    /// Interface method names, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    /// Extended base type, unused for Go
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extends: String,
    /// Implemented interfaces, unused for Go
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
    /// Full source text of the declaration span
    pub body: String,
    /// Content hash of `body`; the dedup identity of this element
    pub content_hash: String,
    /// Leading comment block, verbatim with comment markers
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub docstring: String,
    /// Import paths of the enclosing file (functions and methods only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    /// Whether the name is exported (starts with an uppercase letter)
    #[serde(default, skip_serializing_if = "is_false")]
    pub exported: bool,
    /// Source language identifier
    pub language: String,
    /// When this element was extracted
    pub indexed_at: DateTime<Utc>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Compute the content hash for an element body.
///
/// SHA-256 truncated to the first 8 bytes, rendered as 16 lowercase hex
/// characters. Two elements with byte-identical bodies always hash the
/// same, regardless of file or position.
pub fn hash_content(body: &str) -> String {
    let digest = Sha256::digest(body.as_bytes());
    digest[..8].iter().map(|b| format!("{b:02x}")).collect()
}
