pub mod lines;
pub mod scanner;

use std::fmt;
use std::ops::Range;

pub use lines::segment;
pub use scanner::strip_block_comments;

/// A zero-based (line, byte column) location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// A half-open range between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

impl TextRange {
    pub fn new(start: Position, end: Position) -> Self {
        TextRange { start, end }
    }

    /// Range covering `columns` on a single line.
    pub fn on_line(line: usize, columns: std::ops::Range<usize>) -> Self {
        TextRange {
            start: Position::new(line, columns.start),
            end: Position::new(line, columns.end),
        }
    }

    /// Whether `position` falls inside this range (end inclusive, matching
    /// how editors treat a cursor sitting right after the last character).
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    /// The smallest range covering both `self` and `other`.
    pub fn cover(&self, other: &TextRange) -> TextRange {
        TextRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// One physical line of comment-stripped source.
///
/// The text keeps its trailing `\n` (if any). `offset` is the byte offset of
/// the line start in the original source; `span` is the byte span of the
/// source line and is what diagnostics use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    text: String,
    range: TextRange,
    offset: usize,
    span: Range<usize>,
}

impl LineRecord {
    pub fn new(text: impl Into<String>, line: usize, offset: usize) -> Self {
        let text = text.into();
        let range = TextRange::on_line(line, 0..text.len());
        let len = text.trim_end_matches(['\n', '\r']).len();
        LineRecord {
            text,
            range,
            offset,
            span: offset..offset + len,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line(&self) -> usize {
        self.range.start.line
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Byte span in the original source, excluding the line terminator.
    /// Expanded lines keep the span of the macro body line they came from.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim_start().is_empty()
    }

    /// A copy of this record carrying different text but the same position.
    /// Used by macro expansion, which keeps the body line's position.
    pub fn with_text(&self, text: String) -> LineRecord {
        let mut range = self.range;
        range.end.column = text.len();
        LineRecord {
            text,
            range,
            offset: self.offset,
            span: self.span.clone(),
        }
    }
}
