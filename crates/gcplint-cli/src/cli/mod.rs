use clap::Parser;
use hiro_system_kit::{self, Logger};
use std::process;

pub mod lint;

use lint::Format;

#[derive(Clone)]
pub struct Context {
    pub logger: Option<Logger>,
}

impl Context {
    pub fn empty() -> Context {
        Context { logger: None }
    }

    pub fn try_log<F>(&self, closure: F)
    where
        F: FnOnce(&Logger),
    {
        if let Some(ref logger) = self.logger {
            closure(logger)
        }
    }
}

/// Lint Google Cloud resources declared in a Terraform module
#[derive(Parser, PartialEq, Clone, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Opts {
    /// Module directory to lint
    #[arg(default_value = ".")]
    pub dir: String,
    /// Output format
    #[arg(long = "format", short = 'f', value_enum, default_value_t = Format::Stylish)]
    pub format: Format,
    /// Path to the configuration file (default: .gcplint.yml in the working directory)
    #[arg(long = "config", short = 'c')]
    pub config: Option<String>,
    /// Create a .gcplint.yml with recommended settings
    #[arg(long = "init")]
    pub init: bool,
    /// Run only the given rule (repeatable)
    #[arg(long = "only", value_name = "RULE")]
    pub only: Vec<String>,
    /// Enable a rule (repeatable)
    #[arg(long = "enable-rule", value_name = "RULE")]
    pub enable_rule: Vec<String>,
    /// Disable a rule (repeatable)
    #[arg(long = "disable-rule", value_name = "RULE")]
    pub disable_rule: Vec<String>,
    /// Set an input variable, NAME=VALUE (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE")]
    pub var: Vec<String>,
    /// Load input variables from a tfvars file (repeatable)
    #[arg(long = "var-file", value_name = "PATH")]
    pub var_file: Vec<String>,
    /// Exit with 0 even when issues are found
    #[arg(long = "force")]
    pub force: bool,
    /// Print the rules of this run and exit
    #[arg(long = "list-rules")]
    pub list_rules: bool,
}

pub fn main() {
    let logger = hiro_system_kit::log::setup_logger();
    let _guard = hiro_system_kit::log::setup_global_logger(logger.clone());
    let ctx = Context { logger: Some(logger) };

    let opts: Opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            let _ = e.print();
            process::exit(if e.use_stderr() { lint::EXIT_FAILURE } else { lint::EXIT_OK });
        }
    };

    match lint::run_lint(&opts, &ctx) {
        Ok(code) => process::exit(code),
        Err(e) => {
            ctx.try_log(|logger| error!(logger, "{e}"));
            std::thread::sleep(std::time::Duration::from_millis(500));
            process::exit(lint::EXIT_FAILURE);
        }
    }
}
