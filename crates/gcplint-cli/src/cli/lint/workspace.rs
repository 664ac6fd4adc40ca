//! Module and input variable discovery

use std::fs;
use std::path::{Path, PathBuf};

use gcplint_core::hcl::{parse_assignment, InputVariables, Module, ModuleFile};

use super::config::LinterConfig;
use super::error::LinterError;

pub const TFVARS_FILE: &str = "terraform.tfvars";
pub const AUTO_TFVARS_SUFFIX: &str = ".auto.tfvars";
pub const CONFIG_SUFFIX: &str = ".tf";

/// Files of a module directory as found on disk
#[derive(Debug, Default)]
pub struct Discovered {
    pub files: Vec<PathBuf>,
    pub ignored: Vec<PathBuf>,
}

pub struct WorkspaceAnalyzer {
    config: LinterConfig,
}

impl WorkspaceAnalyzer {
    pub fn new(config: &LinterConfig) -> Self {
        Self { config: config.clone() }
    }

    pub fn module_dir(&self) -> &Path {
        &self.config.module_dir
    }

    /// `.tf` files directly under the module directory, sorted by name, split
    /// into linted and ignored
    pub fn discover(&self) -> Result<Discovered, LinterError> {
        let mut discovered = Discovered::default();
        for name in self.list_dir(|name| name.ends_with(CONFIG_SUFFIX))? {
            if self.config.is_ignored(Path::new(&name)) {
                discovered.ignored.push(PathBuf::from(name));
            } else {
                discovered.files.push(PathBuf::from(name));
            }
        }
        Ok(discovered)
    }

    /// Parse the discovered files into a module
    pub fn load_module(&self, discovered: &Discovered) -> Result<Module, LinterError> {
        let mut module = Module::new(self.module_dir());
        for name in &discovered.files {
            module.add_file(self.parse_file(&self.module_dir().join(name))?);
        }
        Ok(module)
    }

    /// Input variables, lowest precedence first: `terraform.tfvars`,
    /// `*.auto.tfvars` in name order, `--var-file` in order, then `--var`
    pub fn load_inputs(&self) -> Result<InputVariables, LinterError> {
        let mut inputs = InputVariables::new();

        let tfvars = self.module_dir().join(TFVARS_FILE);
        if tfvars.is_file() {
            inputs.add_tfvars(&self.parse_file(&tfvars)?);
        }

        for name in self.list_dir(|name| name.ends_with(AUTO_TFVARS_SUFFIX))? {
            inputs.add_tfvars(&self.parse_file(&self.module_dir().join(name))?);
        }

        for path in &self.config.var_files {
            inputs.add_tfvars(&self.parse_file(path)?);
        }

        for assignment in &self.config.cli_vars {
            let (name, value) = parse_assignment(assignment)
                .ok_or_else(|| LinterError::InvalidVariable(assignment.clone()))?;
            inputs.set_raw(name, value);
        }

        Ok(inputs)
    }

    fn list_dir(&self, filter: impl Fn(&str) -> bool) -> Result<Vec<String>, LinterError> {
        let dir = self.module_dir();
        let entries = fs::read_dir(dir).map_err(|e| LinterError::ModuleDir {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut names = vec![];
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if filter(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn parse_file(&self, path: &Path) -> Result<ModuleFile, LinterError> {
        let source = fs::read_to_string(path)?;
        ModuleFile::parse(display_name(path), source).map_err(|e| LinterError::Parse(e.to_string()))
    }
}

/// Path as shown in diagnostics, without a leading `./`
fn display_name(path: &Path) -> String {
    path.strip_prefix(".").unwrap_or(path).display().to_string()
}
