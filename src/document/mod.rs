//! Markdown dialect parsing.
//!
//! This module handles:
//! - Splitting source text into block elements (headings, images, tables, paragraphs)
//! - Scanning inline markup (bold, italic, strikethrough) inside blocks
//! - The immutable document model both scanners produce

mod inline;
mod parser;
mod types;

pub use inline::scan;
pub use parser::parse;
pub use types::{BlockElement, Document, InlineSpan, Table, TableRow};

/// Markdown file extensions the CLI treats as dialect source.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd", "txt"];

/// Returns true if the file extension is a recognized markdown format.
///
/// Files without an extension are accepted as well.
pub fn is_markdown_file(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_none_or(|ext| MARKDOWN_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
