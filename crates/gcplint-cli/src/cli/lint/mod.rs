//! Lint command: configuration, module discovery, rule runs and output

pub mod config;
pub mod error;
pub mod formatter;
pub mod linter;
pub mod workspace;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use colored::Colorize;

pub use config::{ConfigFile, LinterConfig, Ruleset};
pub use error::LinterError;
pub use formatter::Format;
pub use linter::{LintReport, Linter, EXIT_FAILURE, EXIT_ISSUES, EXIT_OK};
pub use workspace::WorkspaceAnalyzer;

use crate::cli::{Context, Opts};

const DEFAULT_CONFIG: &str = r#"# gcplint configuration

extends: "gcplint:recommended"

rules:
  # Severity is one of error, warning, notice or off
  # google_compute_interconnect_attachment_invalid_type: warning
  # google_cloud_identity_group_invalid_initial_group_config: off

# Glob patterns of files to skip, relative to the module directory
ignore: []
"#;

/// Main entry point for the lint command, returns the process exit code
pub fn run_lint(opts: &Opts, ctx: &Context) -> Result<i32, LinterError> {
    if opts.init {
        init_linter_config(Path::new(config::DEFAULT_CONFIG_FILES[0]))?;
        println!("Created {} with recommended settings", config::DEFAULT_CONFIG_FILES[0]);
        return Ok(EXIT_OK);
    }

    let config = linter_config(opts)?;

    if opts.list_rules {
        list_rules(&config.ruleset()?, &mut io::stdout().lock())?;
        return Ok(EXIT_OK);
    }

    let report = Linter::new(&config).lint(ctx)?;

    let formatter = formatter::get_formatter(config.format, report.sources.clone());
    formatter.format(&report.result, &mut io::stdout().lock())?;

    for failure in &report.failures {
        eprintln!("{} {}: {}", "error:".red().bold(), failure.rule, failure.error);
    }

    Ok(report.exit_code(config.force))
}

/// Linter settings from command line options and the configuration file
pub fn linter_config(opts: &Opts) -> Result<LinterConfig, LinterError> {
    let mut config =
        LinterConfig::new(&opts.dir, opts.format).with_config_file(opts.config.as_deref())?;

    config.only_rules = opts.only.clone();
    config.enabled_rules = opts.enable_rule.clone();
    config.disabled_rules = opts.disable_rule.clone();
    config.cli_vars = opts.var.clone();
    config.var_files = opts.var_file.iter().map(PathBuf::from).collect();
    config.force = opts.force;

    Ok(config)
}

/// Write a default configuration file, never overwriting an existing one
pub fn init_linter_config(path: &Path) -> Result<(), LinterError> {
    if path.exists() {
        return Err(LinterError::ConfigExists(path.to_path_buf()));
    }
    fs::write(path, DEFAULT_CONFIG)?;
    Ok(())
}

pub fn list_rules(ruleset: &Ruleset, out: &mut dyn Write) -> io::Result<()> {
    let width = ruleset.rules.iter().map(|rule| rule.name().len()).max().unwrap_or(0);
    for rule in &ruleset.rules {
        let severity = if rule.enabled() { rule.severity().to_string() } else { "off".to_string() };
        writeln!(
            out,
            "{:<width$}  {:<7}  {}",
            rule.name(),
            severity,
            rule.id().description(),
            width = width
        )?;
    }
    Ok(())
}
