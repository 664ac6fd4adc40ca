use serde_derive::Serialize;

use super::diagnostics::{Diagnostic, DiagnosticLevel};

/// Findings collected over one lint run, grouped by level.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub notices: Vec<Diagnostic>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a diagnostic to the list matching its level
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.level {
            DiagnosticLevel::Error => self.errors.push(diagnostic),
            DiagnosticLevel::Warning => self.warnings.push(diagnostic),
            DiagnosticLevel::Note => self.notices.push(diagnostic),
        }
    }

    pub fn extend(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.notices.extend(other.notices);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn notice_count(&self) -> usize {
        self.notices.len()
    }

    pub fn total(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// All diagnostics, errors first
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().chain(self.warnings.iter()).chain(self.notices.iter())
    }

    /// Order every list by file, then line, then column
    pub fn sort(&mut self) {
        for list in [&mut self.errors, &mut self.warnings, &mut self.notices] {
            list.sort_by(|a, b| {
                (a.file.as_deref(), a.line, a.column).cmp(&(b.file.as_deref(), b.line, b.column))
            });
        }
    }
}
