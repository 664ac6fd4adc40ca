//! Rules and the check pipeline they share
//!
//! Every rule targets one resource type and one attribute. Checking a rule
//! always follows the same steps:
//!
//! 1. fetch the blocks of the resource type, asking only for the attribute
//! 2. skip blocks where the attribute is absent
//! 3. evaluate the attribute expression; unknown and null values are skipped
//! 4. validate the value
//! 5. emit one issue per violation, anchored at the attribute expression
//!
//! Only host failures abort a check. Findings never do.

pub mod iam_member;
pub mod rule_id;
pub mod validators;

use serde_derive::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::runner::{BodySchema, Evaluated, Runner, RunnerError};
use crate::types::DiagnosticLevel;

pub use iam_member::is_valid_iam_member_format;
pub use rule_id::{RuleId, RuleSpec};
pub use validators::{string_in_slice, Validator};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    Display,
    EnumString,
    IntoStaticStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Notice,
}

impl From<Severity> for DiagnosticLevel {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => DiagnosticLevel::Error,
            Severity::Warning => DiagnosticLevel::Warning,
            Severity::Notice => DiagnosticLevel::Note,
        }
    }
}

/// A rule as configured for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    id: RuleId,
    enabled: bool,
    severity: Severity,
}

impl Rule {
    pub fn new(id: RuleId) -> Self {
        Self { id, enabled: id.enabled_by_default(), severity: id.default_severity() }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn id(&self) -> RuleId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.id.into()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn link(&self) -> Option<String> {
        self.id.link()
    }

    pub fn resource_type(&self) -> &'static str {
        self.id.spec().resource_type
    }

    pub fn attribute_name(&self) -> &'static str {
        self.id.spec().attribute_name
    }

    pub fn validator(&self) -> Validator {
        self.id.spec().validator
    }

    /// Run the check pipeline against `runner`.
    ///
    /// Returns `Ok` once every block has been processed, whatever the number
    /// of issues emitted. Any runner error aborts the check unchanged.
    pub fn check<R: Runner + ?Sized>(&self, runner: &mut R) -> Result<(), RunnerError> {
        let attribute_name = self.attribute_name();
        let blocks = runner
            .get_resource_content(self.resource_type(), &BodySchema::attribute(attribute_name))?;

        for block in blocks {
            let Some(attribute) = block.attribute(attribute_name) else {
                continue;
            };

            let value = match runner.evaluate_expr(&attribute.expr)? {
                Evaluated::Known(value) => value,
                Evaluated::Unknown | Evaluated::Null => continue,
            };

            for message in self.validator().validate(&value, attribute_name) {
                runner.emit_issue(self, message, attribute.expr.range())?;
            }
        }

        Ok(())
    }
}

/// Every rule of the catalog with its default settings
pub fn all_rules() -> Vec<Rule> {
    RuleId::iter().map(Rule::new).collect()
}

/// Rules enabled by default
pub fn default_rules() -> Vec<Rule> {
    all_rules().into_iter().filter(Rule::enabled).collect()
}
