use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// A 1-based line/column position together with its byte offset.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
    pub byte: usize,
}

impl Pos {
    pub fn new(line: usize, column: usize, byte: usize) -> Self {
        Self { line, column, byte }
    }
}

/// A span of source text in a named file.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SourceRange {
    pub filename: String,
    pub start: Pos,
    pub end: Pos,
}

impl SourceRange {
    pub fn new(filename: impl Into<String>, start: Pos, end: Pos) -> Self {
        Self { filename: filename.into(), start, end }
    }

    /// Build a range from a byte span in `source`.
    ///
    /// Out of bounds offsets are clamped to the end of the source.
    pub fn from_span(filename: impl Into<String>, source: &str, span: Range<usize>) -> Self {
        let start = offset_to_pos(source, span.start);
        let end = offset_to_pos(source, span.end.max(span.start));
        Self { filename: filename.into(), start, end }
    }

    pub fn bytes(&self) -> Range<usize> {
        self.start.byte..self.end.byte
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.start.line, self.start.column)
    }
}

/// Convert byte offset to a position in source
pub fn offset_to_pos(source: &str, offset: usize) -> Pos {
    let offset = offset.min(source.len());
    let mut line = 1;
    let mut column = 1;

    for (idx, ch) in source.char_indices() {
        if idx >= offset {
            break;
        }

        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    Pos { line, column, byte: offset }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_line_and_column() {
        let source = "line1\nline2\nline3";

        assert_eq!(offset_to_pos(source, 0), Pos::new(1, 1, 0));
        assert_eq!(offset_to_pos(source, 6), Pos::new(2, 1, 6));
        assert_eq!(offset_to_pos(source, 14), Pos::new(3, 3, 14));
    }

    #[test]
    fn test_offset_past_end_is_clamped() {
        let source = "ab\ncd";
        assert_eq!(offset_to_pos(source, 100), Pos::new(2, 3, 5));
    }

    #[test]
    fn test_range_from_span() {
        let source = "resource \"a\" \"b\" {\n  member = \"x\"\n}\n";
        let start = source.find("\"x\"").unwrap();
        let range = SourceRange::from_span("main.tf", source, start..start + 3);

        assert_eq!(range.start.line, 2);
        assert_eq!(range.start.column, 12);
        assert_eq!(range.end.column, 15);
        assert_eq!(range.to_string(), "main.tf:2:12");
        assert_eq!(&source[range.bytes()], "\"x\"");
    }
}
