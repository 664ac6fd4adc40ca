pub mod diagnostic_types;
pub mod diagnostics;
pub mod range;
pub mod result;

pub use diagnostics::{Diagnostic, DiagnosticLevel, DiagnosticSpan};
pub use range::{Pos, SourceRange};
pub use result::ValidationResult;
