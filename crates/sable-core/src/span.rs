//! Source positions and spans.
//!
//! Positions are 1-based (line, column) pairs where the column counts
//! characters, not bytes. A [`Span`] additionally remembers the byte range it
//! was computed from, so the exact source text can always be sliced back out.

use std::ops::Range;

use derive_more::Display;

/// A 1-based line/column position in a source file.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("{line}:{column}")]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// The source extent of a syntax or AST node.
///
/// `end` is derived from `offset + len` when the span is created and points
/// one character past the last character of the node.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
#[display("{start}-{end}")]
pub struct Span {
    pub start: Position,
    pub end: Position,
    /// Byte offset of the first byte.
    pub offset: usize,
    /// Width in bytes.
    pub len: usize,
}

impl Span {
    /// Compute a span for `range` using the line starts cached in `index`.
    pub fn from_range(index: &LineIndex, range: Range<usize>) -> Self {
        let range = range.start..range.end.max(range.start);
        Self {
            start: index.position(range.start),
            end: index.position(range.end),
            offset: range.start,
            len: range.end - range.start,
        }
    }

    /// A zero-width span at `offset`.
    pub fn empty_at(index: &LineIndex, offset: usize) -> Self {
        Self::from_range(index, offset..offset)
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `position` falls inside this span (start inclusive, end exclusive).
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position < self.end
    }
}

/// Line index for a source file.
///
/// Caches line start offsets for converting byte offsets to positions.
#[derive(Clone, Debug)]
pub struct LineIndex {
    /// Byte offset of the start of each line (0-indexed).
    line_starts: Vec<usize>,
    source: std::rc::Rc<str>,
}

impl LineIndex {
    pub fn new(source: impl Into<std::rc::Rc<str>>) -> Self {
        let source = source.into();
        let mut line_starts = vec![0];
        for (i, c) in source.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            source,
        }
    }

    /// Convert a byte offset to a 1-based position.
    ///
    /// Offsets past the end of the text clamp to the end position.
    pub fn position(&self, offset: usize) -> Position {
        let mut offset = offset.min(self.source.len());
        while !self.source.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line];
        let column = self.source[line_start..offset].chars().count();
        Position::new(line as u32 + 1, column as u32 + 1)
    }

    /// Convert a 1-based position back to a byte offset.
    pub fn offset(&self, position: Position) -> Option<usize> {
        let line = (position.line as usize).checked_sub(1)?;
        let line_start = *self.line_starts.get(line)?;
        let line_end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.source.len());
        let line_text = &self.source[line_start..line_end];
        let column = (position.column as usize).checked_sub(1)?;
        match line_text.char_indices().nth(column) {
            Some((byte, _)) => Some(line_start + byte),
            None => Some(line_end),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn text(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_first_line() {
        let index = LineIndex::new("hello world");
        assert_eq!(index.position(0), Position::new(1, 1));
        assert_eq!(index.position(6), Position::new(1, 7));
    }

    #[test]
    fn test_position_multiline() {
        let index = LineIndex::new("line1\nline2\nline3");
        assert_eq!(index.position(6), Position::new(2, 1));
        assert_eq!(index.position(14), Position::new(3, 3));
        assert_eq!(index.line_count(), 3);
    }

    #[test]
    fn test_position_counts_characters() {
        let index = LineIndex::new("héllo x");
        // 'é' is two bytes
        assert_eq!(index.position(7), Position::new(1, 7));
    }

    #[test]
    fn test_position_clamps_past_end() {
        let index = LineIndex::new("abc");
        assert_eq!(index.position(100), Position::new(1, 4));
    }

    #[test]
    fn test_offset_roundtrip() {
        let index = LineIndex::new("fn f() {\n  out 1;\n}");
        let position = index.position(11);
        assert_eq!(position, Position::new(2, 3));
        assert_eq!(index.offset(position), Some(11));
        assert_eq!(index.offset(Position::new(9, 1)), None);
    }

    #[test]
    fn test_span_contains_is_end_exclusive() {
        let index = LineIndex::new("out 42;");
        let span = Span::from_range(&index, 4..6);
        assert_eq!(span.start, Position::new(1, 5));
        assert_eq!(span.end, Position::new(1, 7));
        assert!(span.contains(Position::new(1, 5)));
        assert!(span.contains(Position::new(1, 6)));
        assert!(!span.contains(Position::new(1, 7)));
        assert_eq!(span.range(), 4..6);
    }

    #[test]
    fn test_empty_span_contains_nothing() {
        let index = LineIndex::new("abc");
        let span = Span::empty_at(&index, 1);
        assert!(span.is_empty());
        assert!(!span.contains(Position::new(1, 2)));
        assert_eq!(span.to_string(), "1:2-1:2");
    }
}
