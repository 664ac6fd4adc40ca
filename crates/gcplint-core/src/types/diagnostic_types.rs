use serde_derive::{Deserialize, Serialize};
use std::fmt::Display;

use super::range::SourceRange;

/// Severity level for diagnostics
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Note,
    Warning,
    Error,
}

impl Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticLevel::Error => write!(f, "error"),
            DiagnosticLevel::Warning => write!(f, "warning"),
            DiagnosticLevel::Note => write!(f, "notice"),
        }
    }
}

/// Span information with line/column ranges
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagnosticSpan {
    pub line_start: u32,
    pub line_end: u32,
    pub column_start: u32,
    pub column_end: u32,
}

impl DiagnosticSpan {
    /// Number of columns covered on the first line, at least one.
    ///
    /// Multi-line spans are underlined up to the end of the first line by
    /// the caller, so this only answers for single-line spans.
    pub fn width(&self) -> Option<usize> {
        if self.line_start != self.line_end {
            return None;
        }
        Some(self.column_end.saturating_sub(self.column_start).max(1) as usize)
    }
}

impl From<&SourceRange> for DiagnosticSpan {
    fn from(range: &SourceRange) -> Self {
        DiagnosticSpan {
            line_start: range.start.line as u32,
            line_end: range.end.line as u32,
            column_start: range.start.column as u32,
            column_end: range.end.column as u32,
        }
    }
}
