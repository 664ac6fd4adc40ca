//! Terraform host: parsed module files, input variables, expression
//! evaluation and a [`Runner`](crate::runner::Runner) over them.

pub mod evaluator;
pub mod module;
pub mod runner;
pub mod variables;

pub use evaluator::{EvalError, Evaluator, DEFAULT_WORKSPACE};
pub use module::{Module, ModuleFile};
pub use runner::HclRunner;
pub use variables::{parse_assignment, InputVariables, VariableValue};
