//! Input variable values supplied from outside the module
//!
//! Later sources override earlier ones: tfvars files in the order they are
//! added, then raw `name=value` assignments.

use std::collections::HashMap;

use hcl_edit::expr::Expression;

use super::module::ModuleFile;

#[derive(Debug, Clone, PartialEq)]
pub enum VariableValue {
    /// Given on the command line, always a string
    Raw(String),
    /// Assigned in a tfvars file, evaluated like any expression
    Expr(Expression),
}

#[derive(Debug, Clone, Default)]
pub struct InputVariables {
    values: HashMap<String, VariableValue>,
}

impl InputVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every top-level attribute of a tfvars file
    pub fn add_tfvars(&mut self, file: &ModuleFile) {
        for attribute in file.body().attributes() {
            self.values.insert(
                attribute.key.as_str().to_string(),
                VariableValue::Expr(attribute.value.clone()),
            );
        }
    }

    pub fn set_raw(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), VariableValue::Raw(value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&VariableValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Split a `name=value` assignment
pub fn parse_assignment(assignment: &str) -> Option<(&str, &str)> {
    let (name, value) = assignment.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value))
}
