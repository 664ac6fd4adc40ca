use std::fmt::Display;

use serde_derive::{Deserialize, Serialize};

pub use super::diagnostic_types::{DiagnosticLevel, DiagnosticSpan};
use super::range::SourceRange;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub code: Option<String>,
    pub span: Option<DiagnosticSpan>,
    pub file: Option<String>,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub documentation: Option<String>,
}

impl Diagnostic {
    fn from_level(level: DiagnosticLevel, message: String) -> Diagnostic {
        Diagnostic {
            level,
            message,
            code: None,
            span: None,
            file: None,
            line: None,
            column: None,
            documentation: None,
        }
    }

    // Builder methods
    pub fn error(message: impl Into<String>) -> Self {
        Self::from_level(DiagnosticLevel::Error, message.into())
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::from_level(DiagnosticLevel::Warning, message.into())
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self::from_level(DiagnosticLevel::Note, message.into())
    }

    pub fn with_level(mut self, level: DiagnosticLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_code(mut self, code: impl AsRef<str>) -> Self {
        self.code = Some(code.as_ref().to_string());
        self
    }

    pub fn with_file(mut self, file: impl AsRef<str>) -> Self {
        self.file = Some(file.as_ref().to_string());
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_documentation(mut self, doc: impl Into<String>) -> Self {
        self.documentation = Some(doc.into());
        self
    }

    pub fn with_span(mut self, span: DiagnosticSpan) -> Self {
        self.span = Some(span);
        self
    }

    /// Anchor the diagnostic at `range`: file, start line/column and span.
    pub fn with_range(self, range: &SourceRange) -> Self {
        self.with_file(&range.filename)
            .with_line(range.start.line)
            .with_column(range.start.column)
            .with_span(DiagnosticSpan::from(range))
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut msg = String::new();

        if let Some(file) = &self.file {
            msg = format!("{} at {}", self.level, file);
        }

        if let Some(span) = &self.span {
            msg = format!("{}:{}:{}", msg, span.line_start, span.column_start);
        } else if let Some(line) = self.line {
            if let Some(column) = self.column {
                msg = format!("{}:{}:{}", msg, line, column);
            } else {
                msg = format!("{}:{}", msg, line);
            }
        }

        let level_with_code = if let Some(code) = &self.code {
            format!("{}[{}]", self.level, code)
        } else {
            format!("{}", self.level)
        };

        msg = format!(
            "{}{}{}: {}",
            msg,
            if !msg.is_empty() { "\n\t" } else { "" },
            level_with_code,
            self.message
        );
        write!(f, "{}", msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::range::Pos;

    #[test]
    fn test_with_range_anchors_location() {
        let range = SourceRange::new("main.tf", Pos::new(4, 12, 80), Pos::new(4, 33, 101));
        let diagnostic = Diagnostic::error("bad value").with_range(&range);

        assert_eq!(diagnostic.file.as_deref(), Some("main.tf"));
        assert_eq!(diagnostic.line, Some(4));
        assert_eq!(diagnostic.column, Some(12));
        assert_eq!(diagnostic.span.as_ref().and_then(|s| s.width()), Some(21));
    }

    #[test]
    fn test_display_includes_code_and_location() {
        let range = SourceRange::new("main.tf", Pos::new(2, 3, 10), Pos::new(2, 9, 16));
        let diagnostic = Diagnostic::warning("looks odd")
            .with_code("some_rule")
            .with_range(&range);

        assert_eq!(diagnostic.to_string(), "warning at main.tf:2:3\n\twarning[some_rule]: looks odd");
    }

    #[test]
    fn test_display_without_location() {
        assert_eq!(Diagnostic::note("hello").to_string(), "notice: hello");
    }
}
