//! Host contract used by rules
//!
//! A [`Runner`] hands resource blocks to rules, evaluates attribute
//! expressions and records the issues rules emit. Rules never parse or
//! evaluate configuration themselves.

use std::collections::HashMap;

use hcl_edit::expr::Expression;

use crate::rules::Rule;
use crate::types::SourceRange;

/// Attribute names a rule wants extracted from each block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodySchema {
    pub attributes: Vec<AttributeSchema>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSchema {
    pub name: String,
}

impl BodySchema {
    /// Schema requesting exactly one attribute
    pub fn attribute(name: impl Into<String>) -> Self {
        Self { attributes: vec![AttributeSchema { name: name.into() }] }
    }

    pub fn requests(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }
}

/// An unevaluated expression together with the range it was parsed from.
#[derive(Debug, Clone)]
pub struct Expr {
    inner: Expression,
    range: SourceRange,
}

impl Expr {
    pub fn new(inner: Expression, range: SourceRange) -> Self {
        Self { inner, range }
    }

    pub fn inner(&self) -> &Expression {
        &self.inner
    }

    pub fn range(&self) -> &SourceRange {
        &self.range
    }
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub expr: Expr,
}

/// One declared `resource "<type>" "<name>"` block.
#[derive(Debug, Clone)]
pub struct ResourceBlock {
    pub resource_type: String,
    pub name: String,
    pub range: SourceRange,
    pub attributes: HashMap<String, Attribute>,
}

impl ResourceBlock {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }
}

/// Outcome of evaluating an expression to a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluated {
    Known(String),
    /// Depends on something only known after apply, or that the host
    /// cannot resolve statically.
    Unknown,
    Null,
}

impl Evaluated {
    pub fn known(value: impl Into<String>) -> Self {
        Evaluated::Known(value.into())
    }

    pub fn as_known(&self) -> Option<&str> {
        match self {
            Evaluated::Known(value) => Some(value),
            _ => None,
        }
    }
}

/// Infrastructure failures. Always fatal to the rule being checked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunnerError {
    #[error("failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    #[error("failed to fetch `{resource_type}` resources: {message}")]
    Fetch { resource_type: String, message: String },

    #[error("{range}: failed to evaluate expression: {message}")]
    Evaluation { range: SourceRange, message: String },

    #[error("failed to emit issue for {rule}: {message}")]
    Emit { rule: String, message: String },
}

pub trait Runner {
    /// Every block of `resource_type`, with only the attributes in `schema`.
    /// Missing attributes are absent from the block, never an error.
    fn get_resource_content(
        &self,
        resource_type: &str,
        schema: &BodySchema,
    ) -> Result<Vec<ResourceBlock>, RunnerError>;

    fn evaluate_expr(&self, expr: &Expr) -> Result<Evaluated, RunnerError>;

    fn emit_issue(
        &mut self,
        rule: &Rule,
        message: String,
        range: &SourceRange,
    ) -> Result<(), RunnerError>;
}
