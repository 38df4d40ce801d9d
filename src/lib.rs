pub mod cli;
pub mod commands;
pub mod config;
pub mod element;
pub mod extractor;
pub mod index;
pub mod logging;
pub mod rag;
pub mod walker;

pub use config::Config;
pub use element::{CodeElement, ElementKind, Param};
pub use extractor::{Extraction, GoExtractor};
pub use index::{ContentIndex, IndexStats};
