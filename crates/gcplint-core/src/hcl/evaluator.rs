//! Best-effort evaluation of attribute expressions to strings
//!
//! Literals, templates, input variables, locals, `terraform.workspace` and
//! `path.*` are resolved. Anything that needs provider or plan data
//! (resource attributes, data sources, module outputs, function calls,
//! conditionals, operators) evaluates to [`Evaluated::Unknown`].

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use hcl_edit::expr::{Expression, TraversalOperator};
use hcl_edit::template::Element;

use super::module::{label_str, Module};
use super::variables::{InputVariables, VariableValue};
use crate::runner::Evaluated;

pub const DEFAULT_WORKSPACE: &str = "default";

/// Evaluation failure that is not about a value being unknown
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("Inappropriate value for attribute: string required, got {0}")]
    TypeMismatch(&'static str),

    #[error("Reference to undeclared input variable `{0}`")]
    UndeclaredVariable(String),

    #[error("Reference to undeclared local value `{0}`")]
    UndeclaredLocal(String),
}

#[derive(Debug, Clone)]
pub struct Evaluator {
    /// Declared variables with their default, if any
    variables: HashMap<String, Option<Expression>>,
    locals: HashMap<String, Expression>,
    inputs: InputVariables,
    workspace: String,
    module_dir: PathBuf,
}

impl Evaluator {
    pub fn new(module: &Module, inputs: InputVariables) -> Self {
        let mut variables = HashMap::new();
        for (_, block) in module.blocks("variable") {
            let Some(name) = block.labels.first().map(label_str) else {
                continue;
            };
            let default = block
                .body
                .attributes()
                .find(|attribute| attribute.key.as_str() == "default")
                .map(|attribute| attribute.value.clone());
            variables.insert(name.to_string(), default);
        }

        let mut locals = HashMap::new();
        for (_, block) in module.blocks("locals") {
            for attribute in block.body.attributes() {
                locals.insert(attribute.key.as_str().to_string(), attribute.value.clone());
            }
        }

        Self {
            variables,
            locals,
            inputs,
            workspace: DEFAULT_WORKSPACE.to_string(),
            module_dir: module.dir().to_path_buf(),
        }
    }

    pub fn with_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = workspace.into();
        self
    }

    pub fn evaluate(&self, expr: &Expression) -> Result<Evaluated, EvalError> {
        self.eval(expr, &mut HashSet::new())
    }

    fn eval(&self, expr: &Expression, resolving: &mut HashSet<String>) -> Result<Evaluated, EvalError> {
        match expr {
            Expression::Null(_) => Ok(Evaluated::Null),
            Expression::String(value) => Ok(Evaluated::Known(value.value().clone())),
            Expression::Number(value) => Ok(Evaluated::Known(value.value().to_string())),
            Expression::Bool(value) => Ok(Evaluated::Known(value.value().to_string())),
            Expression::Array(_) => Err(EvalError::TypeMismatch("tuple")),
            Expression::Object(_) => Err(EvalError::TypeMismatch("object")),
            Expression::Parenthesis(inner) => self.eval(inner.inner(), resolving),
            Expression::StringTemplate(template) => {
                self.eval_elements(template.into_iter(), resolving)
            }
            Expression::HeredocTemplate(heredoc) => {
                self.eval_elements(heredoc.template.iter(), resolving)
            }
            Expression::Traversal(traversal) => {
                let Some(root) = traversal.expr.as_variable() else {
                    return Ok(Evaluated::Unknown);
                };
                let [operator] = traversal.operators.as_slice() else {
                    return Ok(Evaluated::Unknown);
                };
                let TraversalOperator::GetAttr(name) = operator.value() else {
                    return Ok(Evaluated::Unknown);
                };
                self.eval_reference(root.as_str(), name.as_str(), resolving)
            }
            _ => Ok(Evaluated::Unknown),
        }
    }

    fn eval_elements<'a>(
        &self,
        elements: impl Iterator<Item = &'a Element>,
        resolving: &mut HashSet<String>,
    ) -> Result<Evaluated, EvalError> {
        let mut value = String::new();
        for element in elements {
            match element {
                Element::Literal(literal) => value.push_str(literal.value()),
                Element::Interpolation(interpolation) => {
                    match self.eval(&interpolation.expr, resolving)? {
                        Evaluated::Known(part) => value.push_str(&part),
                        Evaluated::Unknown => return Ok(Evaluated::Unknown),
                        // Terraform refuses to interpolate null
                        Evaluated::Null => return Ok(Evaluated::Unknown),
                    }
                }
                Element::Directive(_) => return Ok(Evaluated::Unknown),
            }
        }
        Ok(Evaluated::Known(value))
    }

    fn eval_reference(
        &self,
        root: &str,
        name: &str,
        resolving: &mut HashSet<String>,
    ) -> Result<Evaluated, EvalError> {
        match root {
            "var" => self.eval_variable(name, resolving),
            "local" => self.eval_local(name, resolving),
            "terraform" if name == "workspace" => Ok(Evaluated::Known(self.workspace.clone())),
            "path" if name == "module" || name == "root" => {
                Ok(Evaluated::Known(self.module_dir.display().to_string()))
            }
            _ => Ok(Evaluated::Unknown),
        }
    }

    fn eval_variable(&self, name: &str, resolving: &mut HashSet<String>) -> Result<Evaluated, EvalError> {
        let Some(default) = self.variables.get(name) else {
            return Err(EvalError::UndeclaredVariable(name.to_string()));
        };

        match (self.inputs.get(name), default) {
            (Some(VariableValue::Raw(value)), _) => Ok(Evaluated::Known(value.clone())),
            (Some(VariableValue::Expr(expr)), _) | (None, Some(expr)) => {
                self.eval_guarded(format!("var.{}", name), expr, resolving)
            }
            // No value until one is supplied at plan time
            (None, None) => Ok(Evaluated::Unknown),
        }
    }

    fn eval_local(&self, name: &str, resolving: &mut HashSet<String>) -> Result<Evaluated, EvalError> {
        let Some(expr) = self.locals.get(name) else {
            return Err(EvalError::UndeclaredLocal(name.to_string()));
        };
        self.eval_guarded(format!("local.{}", name), expr, resolving)
    }

    /// Evaluate a named value, treating self-references as unknown
    fn eval_guarded(
        &self,
        key: String,
        expr: &Expression,
        resolving: &mut HashSet<String>,
    ) -> Result<Evaluated, EvalError> {
        if !resolving.insert(key.clone()) {
            return Ok(Evaluated::Unknown);
        }
        let result = self.eval(expr, resolving);
        resolving.remove(&key);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const DECLARATIONS: &str = r#"
variable "member" {
  default = "user:a@example.com"
}

variable "project" {}

variable "protocol" {
  type    = string
  default = null
}

locals {
  prefix   = "user"
  member   = "${local.prefix}:${var.project}"
  full     = "${local.prefix}:b@example.com"
  looping  = local.looping
  computed = google_service_account.sa.email
}
"#;

    fn evaluator(inputs: InputVariables) -> Evaluator {
        let module = Module::from_sources("modules/iam", vec![("variables.tf", DECLARATIONS)]).unwrap();
        Evaluator::new(&module, inputs)
    }

    fn eval(source: &str) -> Result<Evaluated, EvalError> {
        eval_with(source, InputVariables::new())
    }

    fn eval_with(source: &str, inputs: InputVariables) -> Result<Evaluated, EvalError> {
        let expr: Expression = source.parse().unwrap();
        evaluator(inputs).evaluate(&expr)
    }

    #[test_case(r#""HTTPS""#, "HTTPS" ; "string literal")]
    #[test_case("42", "42" ; "number")]
    #[test_case("true", "true" ; "bool")]
    #[test_case(r#"("TCP")"#, "TCP" ; "parenthesis")]
    #[test_case(r#""${local.prefix}:c@example.com""#, "user:c@example.com" ; "template with local")]
    #[test_case("var.member", "user:a@example.com" ; "variable default")]
    #[test_case("local.full", "user:b@example.com" ; "local template")]
    #[test_case("terraform.workspace", "default" ; "workspace")]
    #[test_case("path.module", "modules/iam" ; "module path")]
    fn test_known_values(source: &str, expected: &str) {
        assert_eq!(eval(source), Ok(Evaluated::known(expected)));
    }

    #[test_case("google_service_account.sa.email" ; "resource attribute")]
    #[test_case("data.google_project.p.number" ; "data source")]
    #[test_case("module.iam.member" ; "module output")]
    #[test_case("lower(\"USER:a@example.com\")" ; "function call")]
    #[test_case("var.project" ; "variable without value")]
    #[test_case("local.member" ; "local depending on unset variable")]
    #[test_case("local.computed" ; "local depending on resource")]
    #[test_case("local.looping" ; "self referencing local")]
    #[test_case(r#""user:${google_service_account.sa.email}""#; "template with unknown part")]
    #[test_case(r#"true ? "HTTP" : "HTTPS""# ; "conditional")]
    #[test_case("each.value" ; "for each value")]
    fn test_unknown_values(source: &str) {
        assert_eq!(eval(source), Ok(Evaluated::Unknown));
    }

    #[test]
    fn test_null_values() {
        assert_eq!(eval("null"), Ok(Evaluated::Null));
        assert_eq!(eval("var.protocol"), Ok(Evaluated::Null));
    }

    #[test]
    fn test_collections_are_type_errors() {
        assert_eq!(eval(r#"["user:a@example.com"]"#), Err(EvalError::TypeMismatch("tuple")));
        assert_eq!(eval(r#"{ a = "b" }"#), Err(EvalError::TypeMismatch("object")));
    }

    #[test]
    fn test_undeclared_references_are_errors() {
        assert_eq!(eval("var.nope"), Err(EvalError::UndeclaredVariable("nope".to_string())));
        assert_eq!(eval("local.nope"), Err(EvalError::UndeclaredLocal("nope".to_string())));
    }

    #[test]
    fn test_inputs_override_defaults() {
        let mut inputs = InputVariables::new();
        inputs.set_raw("member", "group:ops@example.com");
        inputs.set_raw("project", "my-project");

        assert_eq!(eval_with("var.member", inputs.clone()), Ok(Evaluated::known("group:ops@example.com")));
        assert_eq!(eval_with("local.member", inputs), Ok(Evaluated::known("user:my-project")));
    }

    #[test]
    fn test_workspace_override() {
        let expr: Expression = "terraform.workspace".parse().unwrap();
        let evaluator = evaluator(InputVariables::new()).with_workspace("staging");
        assert_eq!(evaluator.evaluate(&expr), Ok(Evaluated::known("staging")));
    }
}
