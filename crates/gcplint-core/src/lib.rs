//! Rule engine for linting Google Cloud resources declared in Terraform.
//!
//! - [`rules`]: the rule catalog, the value validators and the check
//!   pipeline shared by every rule
//! - [`runner`]: the contract a host implements to feed rules
//! - [`hcl`]: a host over parsed Terraform files
//! - [`types`]: diagnostics and source positions

pub mod hcl;
pub mod rules;
pub mod runner;
pub mod types;

pub use rules::{all_rules, default_rules, Rule, RuleId, Severity, Validator};
pub use runner::{Evaluated, Runner, RunnerError};
pub use types::{Diagnostic, DiagnosticLevel, SourceRange, ValidationResult};
