//! Presentation node types.

use crate::image::SharedImage;

/// Point size of body text, table cells included.
const BODY_POINT_SIZE: f32 = 14.0;

/// Style flags for a text run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
}

impl RunStyle {
    pub const fn is_plain(self) -> bool {
        !self.bold && !self.italic && !self.strikethrough
    }
}

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub style: RunStyle,
}

/// What a block of styled text represents, used for sizing and emphasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    /// Heading with level (1-6)
    Heading(u8),
    Body,
    TableHeader,
    TableCell,
}

impl TextRole {
    /// Suggested point size: 22 for a level 1 heading, shrinking by 2 per
    /// level, and 14 for everything else.
    pub fn point_size(self) -> f32 {
        match self {
            Self::Heading(level) => 24.0 - 2.0 * f32::from(level.clamp(1, 6)),
            Self::Body | Self::TableHeader | Self::TableCell => BODY_POINT_SIZE,
        }
    }
}

/// A block of styled runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledText {
    pub role: TextRole,
    pub runs: Vec<TextRun>,
}

impl StyledText {
    pub fn point_size(&self) -> f32 {
        self.role.point_size()
    }

    /// Text of all runs, concatenated.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// An image placeholder, with the decoded image when it could be resolved.
#[derive(Debug, Clone)]
pub struct ImageNode {
    pub alt_text: String,
    pub url: String,
    pub image: Option<SharedImage>,
}

impl ImageNode {
    /// Label to show in place of the image: the alt text, or the source
    /// when the alt text is empty.
    pub fn label(&self) -> &str {
        if self.alt_text.is_empty() {
            &self.url
        } else {
            &self.alt_text
        }
    }

    pub const fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    /// Pixel dimensions of the resolved image.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(|image| (image.width(), image.height()))
    }
}

/// One table row; `header` is set on row 0 only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    pub header: bool,
    pub cells: Vec<StyledText>,
}

/// A table as rows of styled cells. Rows are not padded to a common width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableGrid {
    pub rows: Vec<GridRow>,
}

impl TableGrid {
    /// The widest row's cell count.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|row| row.cells.len()).max().unwrap_or(0)
    }
}

/// A renderer-agnostic output unit.
#[derive(Debug, Clone)]
pub enum PresentationNode {
    StyledText(StyledText),
    Image(ImageNode),
    TableGrid(TableGrid),
}
