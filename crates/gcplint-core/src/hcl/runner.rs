use std::collections::HashMap;

use hcl_edit::Span;

use super::evaluator::Evaluator;
use super::module::{label_str, Module};
use super::variables::InputVariables;
use crate::rules::Rule;
use crate::runner::{Attribute, BodySchema, Evaluated, Expr, ResourceBlock, Runner, RunnerError};
use crate::types::{Diagnostic, DiagnosticLevel, SourceRange, ValidationResult};

/// [`Runner`] over the parsed files of a module.
///
/// Issues are collected into a [`ValidationResult`] with the emitting rule's
/// severity, name and documentation link.
pub struct HclRunner<'m> {
    module: &'m Module,
    evaluator: Evaluator,
    result: ValidationResult,
}

impl<'m> HclRunner<'m> {
    pub fn new(module: &'m Module, inputs: InputVariables) -> Self {
        Self { module, evaluator: Evaluator::new(module, inputs), result: ValidationResult::new() }
    }

    pub fn with_evaluator(module: &'m Module, evaluator: Evaluator) -> Self {
        Self { module, evaluator, result: ValidationResult::new() }
    }

    pub fn result(&self) -> &ValidationResult {
        &self.result
    }

    pub fn into_result(self) -> ValidationResult {
        self.result
    }
}

impl Runner for HclRunner<'_> {
    fn get_resource_content(
        &self,
        resource_type: &str,
        schema: &BodySchema,
    ) -> Result<Vec<ResourceBlock>, RunnerError> {
        let mut blocks = vec![];

        for (file, block) in self.module.blocks("resource") {
            let mut labels = block.labels.iter().map(label_str);
            let (Some(block_type), Some(name)) = (labels.next(), labels.next()) else {
                return Err(RunnerError::Fetch {
                    resource_type: resource_type.to_string(),
                    message: format!(
                        "{}: resource blocks need a type and a name label",
                        file.range(block.span())
                    ),
                });
            };
            if block_type != resource_type {
                continue;
            }

            let attributes: HashMap<String, Attribute> = block
                .body
                .attributes()
                .filter(|attribute| schema.requests(attribute.key.as_str()))
                .map(|attribute| {
                    let name = attribute.key.as_str().to_string();
                    let attribute = Attribute {
                        name: name.clone(),
                        expr: Expr::new(attribute.value.clone(), file.range(attribute.value.span())),
                    };
                    (name, attribute)
                })
                .collect();

            blocks.push(ResourceBlock {
                resource_type: block_type.to_string(),
                name: name.to_string(),
                range: file.range(block.span()),
                attributes,
            });
        }

        Ok(blocks)
    }

    fn evaluate_expr(&self, expr: &Expr) -> Result<Evaluated, RunnerError> {
        self.evaluator.evaluate(expr.inner()).map_err(|e| RunnerError::Evaluation {
            range: expr.range().clone(),
            message: e.to_string(),
        })
    }

    fn emit_issue(
        &mut self,
        rule: &Rule,
        message: String,
        range: &SourceRange,
    ) -> Result<(), RunnerError> {
        let mut diagnostic = Diagnostic::error(message)
            .with_level(DiagnosticLevel::from(rule.severity()))
            .with_code(rule.name())
            .with_range(range);

        if let Some(link) = rule.link() {
            diagnostic = diagnostic.with_documentation(link);
        }

        self.result.push(diagnostic);
        Ok(())
    }
}
