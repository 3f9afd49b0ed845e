//! Inline markup scanning.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::types::InlineSpan;

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static STRIKETHROUGH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~~(.+?)~~").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Markup {
    Bold,
    Italic,
    Strikethrough,
}

impl Markup {
    /// Scan order doubles as the tie-break when two matches start together.
    const ALL: [Self; 3] = [Self::Bold, Self::Italic, Self::Strikethrough];

    fn regex(self) -> &'static Regex {
        match self {
            Self::Bold => &BOLD,
            Self::Italic => &ITALIC,
            Self::Strikethrough => &STRIKETHROUGH,
        }
    }

    fn span(self, text: &str) -> InlineSpan {
        let text = text.to_string();
        match self {
            Self::Bold => InlineSpan::Bold(text),
            Self::Italic => InlineSpan::Italic(text),
            Self::Strikethrough => InlineSpan::Strikethrough(text),
        }
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    /// Whole match including delimiters
    whole: Range<usize>,
    /// Interior between the delimiters
    inner: Range<usize>,
}

/// Next match of `markup` at or after byte offset `from`.
fn find_candidate(line: &str, markup: Markup, from: usize) -> Option<Candidate> {
    let caps = markup.regex().captures_at(line, from)?;
    let whole = caps.get(0)?.range();
    let inner = caps.get(1)?.range();
    Some(Candidate { whole, inner })
}

/// Split one line of text into inline spans.
///
/// Bold (`**x**`), italic (`*x*`) and strikethrough (`~~x~~`) runs are
/// recognized. At each step the match starting earliest wins; matches
/// starting at the same offset prefer bold, then italic, then
/// strikethrough. Unterminated or empty delimiters stay literal.
///
/// # Example
///
/// ```
/// use marklet::document::{InlineSpan, scan};
///
/// let spans = scan("a **b** c");
/// assert_eq!(spans[1], InlineSpan::Bold("b".to_string()));
/// ```
pub fn scan(line: &str) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    let mut pos = 0;
    // Patterns have no anchors or look-around, so a match found from an
    // earlier cursor stays the leftmost one until the cursor passes its start.
    let mut candidates: [Option<Candidate>; 3] =
        Markup::ALL.map(|markup| find_candidate(line, markup, 0));

    loop {
        let mut best: Option<(Markup, Candidate)> = None;
        for (slot, markup) in candidates.iter_mut().zip(Markup::ALL) {
            if slot.as_ref().is_some_and(|c| c.whole.start < pos) {
                *slot = find_candidate(line, markup, pos);
            }
            let Some(candidate) = slot else { continue };
            if best
                .as_ref()
                .is_none_or(|(_, current)| candidate.whole.start < current.whole.start)
            {
                best = Some((markup, candidate.clone()));
            }
        }

        let Some((markup, candidate)) = best else {
            break;
        };
        if candidate.whole.start > pos {
            spans.push(InlineSpan::PlainText(
                line[pos..candidate.whole.start].to_string(),
            ));
        }
        spans.push(markup.span(&line[candidate.inner]));
        pos = candidate.whole.end;
    }

    if pos < line.len() {
        spans.push(InlineSpan::PlainText(line[pos..].to_string()));
    }
    spans
}
