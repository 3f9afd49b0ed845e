//! Plain terminal output for presentation nodes.
//!
//! Headings keep their `#` markers, images become `[Image: ...]`
//! placeholders and tables are drawn with box characters.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{GridRow, ImageNode, PresentationNode, RunStyle, StyledText, TableGrid, TextRole};

/// Output settings for [`write_nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOptions {
    /// Emit ANSI escapes for bold, italic and strikethrough runs
    pub ansi: bool,
    /// Maximum table width in columns
    pub width: usize,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            ansi: false,
            width: 80,
        }
    }
}

/// Lay out nodes as text, one blank line between blocks.
pub fn write_nodes(nodes: &[PresentationNode], options: TextOptions) -> String {
    let blocks: Vec<String> = nodes
        .iter()
        .map(|node| match node {
            PresentationNode::StyledText(text) => styled_line(text, options),
            PresentationNode::Image(image) => image_placeholder(image),
            PresentationNode::TableGrid(grid) => render_table(grid, options).join("\n"),
        })
        .collect();
    let mut out = blocks.join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn styled_line(text: &StyledText, options: TextOptions) -> String {
    let mut out = String::new();
    if let TextRole::Heading(level) = text.role {
        out.push_str(&"#".repeat(usize::from(level)));
        out.push(' ');
    }
    for run in &text.runs {
        if options.ansi {
            out.push_str(&ansi_wrap(&run.text, run.style));
        } else {
            out.push_str(&run.text);
        }
    }
    out
}

fn ansi_wrap(text: &str, style: RunStyle) -> String {
    if style.is_plain() {
        return text.to_string();
    }
    let mut codes = Vec::new();
    if style.bold {
        codes.push("1");
    }
    if style.italic {
        codes.push("3");
    }
    if style.strikethrough {
        codes.push("9");
    }
    format!("\x1b[{}m{text}\x1b[0m", codes.join(";"))
}

fn image_placeholder(image: &ImageNode) -> String {
    match image.dimensions() {
        Some((width, height)) => format!("[Image: {}] ({width}x{height})", image.label()),
        None => format!("[Image: {}] (unavailable)", image.label()),
    }
}

fn render_table(grid: &TableGrid, options: TextOptions) -> Vec<String> {
    let num_cols = grid.column_count();
    if num_cols == 0 {
        return Vec::new();
    }

    let rows: Vec<Vec<String>> = grid.rows.iter().map(row_texts).collect();
    let mut col_widths = vec![1_usize; num_cols];
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            col_widths[idx] = col_widths[idx].max(display_width(cell));
        }
    }

    // Table row width is: 1 + sum(col_width + 3) for all columns.
    let max_table_width = options.width.max(4);
    while 1 + col_widths.iter().sum::<usize>() + (3 * num_cols) > max_table_width {
        let Some((widest_idx, _)) = col_widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
            break;
        };
        if col_widths[widest_idx] > 1 {
            col_widths[widest_idx] -= 1;
        } else {
            break;
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 3);
    lines.push(render_table_border(&col_widths, '┌', '┬', '┐'));
    for (row, source) in rows.iter().zip(&grid.rows) {
        lines.push(render_table_row(row, &col_widths));
        if source.header && grid.rows.len() > 1 {
            lines.push(render_table_border(&col_widths, '├', '┼', '┤'));
        }
    }
    lines.push(render_table_border(&col_widths, '└', '┴', '┘'));
    lines
}

fn row_texts(row: &GridRow) -> Vec<String> {
    row.cells.iter().map(StyledText::plain_text).collect()
}

fn render_table_border(widths: &[usize], left: char, middle: char, right: char) -> String {
    let mut out = String::new();
    out.push(left);
    for (idx, width) in widths.iter().enumerate() {
        out.push_str(&"─".repeat(width + 2));
        if idx + 1 < widths.len() {
            out.push(middle);
        }
    }
    out.push(right);
    out
}

/// Rows shorter than the table are drawn with empty trailing cells.
fn render_table_row(cells: &[String], widths: &[usize]) -> String {
    let mut out = String::new();
    out.push('│');
    for (idx, width) in widths.iter().enumerate() {
        let content = truncate_text(cells.get(idx).map_or("", String::as_str), *width);
        let padding = width.saturating_sub(display_width(&content));
        out.push(' ');
        out.push_str(&content);
        out.push_str(&" ".repeat(padding));
        out.push_str(" │");
    }
    out
}

fn truncate_text(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut width = 0usize;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        out.push(ch);
        width += ch_width;
    }
    out
}

fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}
