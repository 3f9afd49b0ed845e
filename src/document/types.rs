//! Core document types.

use serde::Serialize;

/// An inline run of text inside a block.
///
/// Styled variants are leaf runs: their text is never scanned again, so
/// markup nested inside a styled run stays literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum InlineSpan {
    PlainText(String),
    Bold(String),
    Italic(String),
    Strikethrough(String),
}

impl InlineSpan {
    /// The text of the run without any style markers.
    pub fn text(&self) -> &str {
        match self {
            Self::PlainText(text)
            | Self::Bold(text)
            | Self::Italic(text)
            | Self::Strikethrough(text) => text,
        }
    }
}

/// A single table row; each cell is its own inline run sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub cells: Vec<Vec<InlineSpan>>,
}

/// A pipe table. Row 0 is the header row; the separator row is not stored.
///
/// Rows keep the cell count they were written with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

impl Table {
    /// The header row, if the table has any rows.
    pub fn header(&self) -> Option<&TableRow> {
        self.rows.first()
    }

    /// Rows after the header.
    pub fn body(&self) -> &[TableRow] {
        self.rows.get(1..).unwrap_or_default()
    }
}

/// A top-level structural unit of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockElement {
    /// Heading with level (1-6)
    Heading { level: u8, content: Vec<InlineSpan> },
    Paragraph { content: Vec<InlineSpan> },
    Image { url: String, alt_text: String },
    Table(Table),
}

impl BlockElement {
    /// Concatenate the leaf text of every span in the block.
    ///
    /// Table cells are joined with single spaces and rows with newlines.
    /// Images contribute their alt text.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Heading { content, .. } | Self::Paragraph { content } => spans_to_string(content),
            Self::Image { alt_text, .. } => alt_text.clone(),
            Self::Table(table) => table
                .rows
                .iter()
                .map(|row| {
                    row.cells
                        .iter()
                        .map(|cell| spans_to_string(cell))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// A parsed document: block elements in source order.
///
/// Documents are immutable once parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Document {
    blocks: Vec<BlockElement>,
}

impl Document {
    pub(crate) const fn from_blocks(blocks: Vec<BlockElement>) -> Self {
        Self { blocks }
    }

    /// Create an empty document.
    pub const fn empty() -> Self {
        Self { blocks: Vec::new() }
    }

    /// All blocks in source order.
    pub fn blocks(&self) -> &[BlockElement] {
        &self.blocks
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over image blocks as `(url, alt_text)` pairs.
    pub fn images(&self) -> impl Iterator<Item = (&str, &str)> {
        self.blocks.iter().filter_map(|block| match block {
            BlockElement::Image { url, alt_text } => Some((url.as_str(), alt_text.as_str())),
            _ => None,
        })
    }

    /// Iterate over headings as `(level, text)` pairs.
    pub fn headings(&self) -> impl Iterator<Item = (u8, String)> + '_ {
        self.blocks.iter().filter_map(|block| match block {
            BlockElement::Heading { level, content } => Some((*level, spans_to_string(content))),
            _ => None,
        })
    }

    /// Leaf text of the whole document, one block per line.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(BlockElement::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a BlockElement;
    type IntoIter = std::slice::Iter<'a, BlockElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

pub(crate) fn spans_to_string(spans: &[InlineSpan]) -> String {
    let mut content = String::new();
    for span in spans {
        content.push_str(span.text());
    }
    content
}
