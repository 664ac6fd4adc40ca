//! Runs the selected rules over one module

use std::collections::HashMap;
use std::env;

use gcplint_core::hcl::{Evaluator, HclRunner, InputVariables, Module, DEFAULT_WORKSPACE};
use gcplint_core::rules::Rule;
use gcplint_core::runner::{BodySchema, Expr, ResourceBlock};
use gcplint_core::{Evaluated, Runner, RunnerError, SourceRange, ValidationResult};

use super::config::{LinterConfig, Ruleset};
use super::error::LinterError;
use super::workspace::WorkspaceAnalyzer;
use crate::cli::Context;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_ISSUES: i32 = 2;

/// A rule that stopped on a fatal error
#[derive(Debug, Clone)]
pub struct RuleFailure {
    pub rule: &'static str,
    pub error: RunnerError,
}

#[derive(Debug, Default)]
pub struct LintReport {
    pub result: ValidationResult,
    pub failures: Vec<RuleFailure>,
    /// File name to content, for formats that print source
    pub sources: HashMap<String, String>,
}

impl LintReport {
    /// 1 when a rule failed, 2 when issues were found (unless forced), else 0
    pub fn exit_code(&self, force: bool) -> i32 {
        if !self.failures.is_empty() {
            EXIT_FAILURE
        } else if !self.result.is_empty() && !force {
            EXIT_ISSUES
        } else {
            EXIT_OK
        }
    }
}

pub struct Linter {
    config: LinterConfig,
}

impl Linter {
    pub fn new(config: &LinterConfig) -> Self {
        Self { config: config.clone() }
    }

    /// Load the module directory and run every enabled rule over it
    pub fn lint(&self, ctx: &Context) -> Result<LintReport, LinterError> {
        if let Some(ref path) = self.config.config_path {
            ctx.try_log(|logger| info!(logger, "Using config file {}", path.display()));
        }
        if let Some(ref config_file) = self.config.config_file {
            for name in config_file.unknown_rules() {
                ctx.try_log(|logger| warn!(logger, "Unknown rule '{}' in config file, ignoring", name));
            }
        }

        let ruleset = self.config.ruleset()?;
        ctx.try_log(|logger| info!(logger, "Running {} rule(s)", ruleset.enabled_count()));

        let analyzer = WorkspaceAnalyzer::new(&self.config);
        let discovered = analyzer.discover()?;
        ctx.try_log(|logger| {
            info!(
                logger,
                "Found {} file(s) in {}",
                discovered.files.len(),
                self.config.module_dir.display()
            )
        });
        for path in &discovered.ignored {
            ctx.try_log(|logger| debug!(logger, "Ignoring {}", path.display()));
        }

        let module = analyzer.load_module(&discovered)?;
        let inputs = analyzer.load_inputs()?;

        Ok(self.lint_module(&module, inputs, &ruleset, ctx))
    }

    /// Run `ruleset` over an already loaded module.
    ///
    /// A rule that fails is recorded and the remaining rules still run.
    pub fn lint_module(
        &self,
        module: &Module,
        inputs: InputVariables,
        ruleset: &Ruleset,
        ctx: &Context,
    ) -> LintReport {
        let workspace = env::var("TF_WORKSPACE").unwrap_or_else(|_| DEFAULT_WORKSPACE.to_string());
        let evaluator = Evaluator::new(module, inputs).with_workspace(workspace);
        let mut runner = LoggingRunner { inner: HclRunner::with_evaluator(module, evaluator), ctx };
        let mut failures = vec![];

        for rule in ruleset.enabled() {
            let before = runner.inner.result().total();
            ctx.try_log(|logger| debug!(logger, "Running rule {}", rule.name()));

            match rule.check(&mut runner) {
                Ok(()) => {
                    let found = runner.inner.result().total() - before;
                    ctx.try_log(|logger| info!(logger, "Rule {}: {} issue(s)", rule.name(), found));
                }
                Err(error) => {
                    ctx.try_log(|logger| error!(logger, "Rule {} failed: {}", rule.name(), error));
                    failures.push(RuleFailure { rule: rule.name(), error });
                }
            }
        }

        let mut result = runner.inner.into_result();
        result.sort();

        let sources = module
            .files()
            .iter()
            .map(|file| (file.name().to_string(), file.source().to_string()))
            .collect();

        LintReport { result, failures, sources }
    }
}

/// Delegates to the module runner and reports skipped values to the log
struct LoggingRunner<'a, 'm> {
    inner: HclRunner<'m>,
    ctx: &'a Context,
}

impl Runner for LoggingRunner<'_, '_> {
    fn get_resource_content(
        &self,
        resource_type: &str,
        schema: &BodySchema,
    ) -> Result<Vec<ResourceBlock>, RunnerError> {
        self.inner.get_resource_content(resource_type, schema)
    }

    fn evaluate_expr(&self, expr: &Expr) -> Result<Evaluated, RunnerError> {
        let evaluated = self.inner.evaluate_expr(expr)?;
        match evaluated {
            Evaluated::Unknown => {
                self.ctx.try_log(|logger| debug!(logger, "{}: value is unknown, skipping", expr.range()))
            }
            Evaluated::Null => {
                self.ctx.try_log(|logger| debug!(logger, "{}: value is null, skipping", expr.range()))
            }
            Evaluated::Known(_) => {}
        }
        Ok(evaluated)
    }

    fn emit_issue(&mut self, rule: &Rule, message: String, range: &SourceRange) -> Result<(), RunnerError> {
        self.inner.emit_issue(rule, message, range)
    }
}
