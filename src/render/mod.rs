//! Mapping parsed documents to presentation nodes.
//!
//! The mapper is a structural walk over a [`Document`]. Its only effect is
//! resolving images through an [`ImageCache`] and an injected
//! [`ImageFetch`] capability; layout and drawing belong to whoever
//! consumes the nodes.

mod nodes;
pub mod text;

pub use nodes::{
    GridRow, ImageNode, PresentationNode, RunStyle, StyledText, TableGrid, TextRole, TextRun,
};

use crate::document::{BlockElement, Document, InlineSpan, Table};
use crate::image::{ImageCache, ImageFetch};

/// Maps documents to presentation nodes, caching images across renders.
#[derive(Debug, Default, Clone)]
pub struct Renderer {
    cache: ImageCache,
}

impl Renderer {
    /// Create a renderer with its own empty image cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a renderer that shares an existing cache.
    pub const fn with_cache(cache: ImageCache) -> Self {
        Self { cache }
    }

    pub const fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Map every block of `document` to a presentation node, in order.
    ///
    /// Images are resolved sequentially through the cache; a failed fetch
    /// yields an [`ImageNode`] without image data.
    pub fn render<F>(&self, document: &Document, fetch: &F) -> Vec<PresentationNode>
    where
        F: ImageFetch + ?Sized,
    {
        let _scope = crate::perf::scope("render.document");
        document
            .blocks()
            .iter()
            .map(|block| self.render_block(block, fetch))
            .collect()
    }

    fn render_block<F>(&self, block: &BlockElement, fetch: &F) -> PresentationNode
    where
        F: ImageFetch + ?Sized,
    {
        match block {
            BlockElement::Heading { level, content } => {
                PresentationNode::StyledText(styled_text(content, TextRole::Heading(*level)))
            }
            BlockElement::Paragraph { content } => {
                PresentationNode::StyledText(styled_text(content, TextRole::Body))
            }
            BlockElement::Image { url, alt_text } => PresentationNode::Image(ImageNode {
                alt_text: alt_text.clone(),
                url: url.clone(),
                image: self.cache.resolve(url, fetch),
            }),
            BlockElement::Table(table) => PresentationNode::TableGrid(table_grid(table)),
        }
    }
}

/// Render with a throwaway cache.
///
/// Convenient for one-off conversions; use a [`Renderer`] to keep images
/// cached between renders.
pub fn render<F>(document: &Document, fetch: &F) -> Vec<PresentationNode>
where
    F: ImageFetch + ?Sized,
{
    Renderer::new().render(document, fetch)
}

/// Map spans to runs, one run per span. Headings force bold.
fn styled_text(spans: &[InlineSpan], role: TextRole) -> StyledText {
    let base = RunStyle {
        bold: matches!(role, TextRole::Heading(_) | TextRole::TableHeader),
        ..RunStyle::default()
    };
    StyledText {
        role,
        runs: spans.iter().map(|span| run_for_span(span, base)).collect(),
    }
}

fn run_for_span(span: &InlineSpan, base: RunStyle) -> TextRun {
    let mut style = base;
    match span {
        InlineSpan::PlainText(_) => {}
        InlineSpan::Bold(_) => style.bold = true,
        InlineSpan::Italic(_) => style.italic = true,
        InlineSpan::Strikethrough(_) => style.strikethrough = true,
    }
    TextRun {
        text: span.text().to_string(),
        style,
    }
}

fn table_grid(table: &Table) -> TableGrid {
    let rows = table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let header = idx == 0;
            let role = if header {
                TextRole::TableHeader
            } else {
                TextRole::TableCell
            };
            GridRow {
                header,
                cells: row.cells.iter().map(|cell| styled_text(cell, role)).collect(),
            }
        })
        .collect();
    TableGrid { rows }
}
