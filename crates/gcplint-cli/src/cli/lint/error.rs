//! Error types for the lint command

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a lint run before or outside rule checks
#[derive(Debug, Error)]
pub enum LinterError {
    /// Failed to read or parse a configuration file
    #[error("Failed to load config from {path}: {message}")]
    ConfigLoad {
        /// Path to the configuration file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Configuration file already exists
    #[error("Configuration file {0} already exists")]
    ConfigExists(PathBuf),

    /// Module directory is missing or unreadable
    #[error("Failed to read module directory {path}: {message}")]
    ModuleDir { path: PathBuf, message: String },

    /// A configuration or variable file could not be parsed
    #[error("{0}")]
    Parse(String),

    /// A rule named on the command line does not exist
    #[error("Rule '{0}' does not exist. Run with --list-rules to see available rules")]
    UnknownRule(String),

    /// A `--var` argument without `=`
    #[error("Invalid variable assignment '{0}', expected NAME=VALUE")]
    InvalidVariable(String),

    /// IO error occurred during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
