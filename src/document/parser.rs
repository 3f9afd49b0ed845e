//! Block-level scanning of the markdown dialect.

use std::sync::LazyLock;

use regex::Regex;

use super::inline::scan;
use super::types::{BlockElement, Document, Table, TableRow};

static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*)").unwrap());
static IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").unwrap());
static TABLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|?\s*:?-+:?\s*(\|\s*:?-+:?\s*)*\|?$").unwrap());

/// Parse markdown source into a Document.
///
/// # Example
///
/// ```
/// use marklet::document::{BlockElement, Document};
///
/// let doc = Document::parse("# Hello\n\nWorld");
/// assert_eq!(doc.len(), 2);
/// assert!(matches!(doc.blocks()[0], BlockElement::Heading { level: 1, .. }));
/// ```
impl Document {
    pub fn parse(source: &str) -> Self {
        parse(source)
    }
}

/// Parse markdown source into a Document.
///
/// Never fails: anything that is not a heading, image or table becomes a
/// paragraph, and blank lines are dropped.
pub fn parse(source: &str) -> Document {
    let _scope = crate::perf::scope("document.parse");
    let lines = split_lines(source);
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if line.is_empty() {
            i += 1;
            continue;
        }

        if let Some(heading) = parse_heading(line) {
            blocks.push(heading);
            i += 1;
            continue;
        }

        if let Some(image) = parse_image(line) {
            blocks.push(image);
            i += 1;
            continue;
        }

        if line.starts_with('|') && lines.get(i + 1).is_some_and(|next| is_separator_row(next)) {
            let (table, next) = parse_table(&lines, i);
            blocks.push(BlockElement::Table(table));
            i = next;
            continue;
        }

        blocks.push(BlockElement::Paragraph {
            content: scan(line),
        });
        i += 1;
    }

    Document::from_blocks(blocks)
}

/// Split on `\n`, `\r\n` and lone `\r`, trimming each line.
fn split_lines(source: &str) -> Vec<&str> {
    source
        .lines()
        .flat_map(|line| line.split('\r'))
        .map(str::trim)
        .collect()
}

fn parse_heading(line: &str) -> Option<BlockElement> {
    let caps = HEADING.captures(line)?;
    let level = u8::try_from(caps.get(1)?.as_str().len()).ok()?;
    let content = caps.get(2).map_or("", |m| m.as_str());
    Some(BlockElement::Heading {
        level,
        content: scan(content),
    })
}

fn parse_image(line: &str) -> Option<BlockElement> {
    if !line.starts_with("![") {
        return None;
    }
    let caps = IMAGE.captures(line)?;
    Some(BlockElement::Image {
        url: caps.get(2).map_or("", |m| m.as_str()).to_string(),
        alt_text: caps.get(1).map_or("", |m| m.as_str()).to_string(),
    })
}

/// A separator row needs at least one pipe so a bare `---` never qualifies.
fn is_separator_row(line: &str) -> bool {
    line.contains('|') && TABLE_SEPARATOR.is_match(line)
}

/// Parse a table starting at its header line.
///
/// Returns the table and the index of the first line after it.
fn parse_table(lines: &[&str], start: usize) -> (Table, usize) {
    let mut rows = vec![parse_table_row(lines[start])];
    let mut index = start + 2;

    while let Some(line) = lines.get(index) {
        if line.is_empty() {
            break;
        }
        rows.push(parse_table_row(line));
        index += 1;
    }

    (Table { rows }, index)
}

fn parse_table_row(line: &str) -> TableRow {
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    TableRow {
        cells: line.split('|').map(|cell| scan(cell.trim())).collect(),
    }
}
