//! Linter configuration

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use gcplint_core::rules::{all_rules, Rule, RuleId};
use serde_derive::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use super::error::LinterError;
use super::formatter::Format;

pub const DEFAULT_CONFIG_FILES: [&str; 2] = [".gcplint.yml", ".gcplint.yaml"];
pub const RECOMMENDED: &str = "gcplint:recommended";

/// Severity as written in a configuration file
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Display,
    AsRefStr,
    EnumString,
    IntoStaticStr,
    Deserialize,
    Serialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    #[serde(alias = "warn")]
    #[strum(to_string = "warning", serialize = "warn")]
    Warning,
    #[serde(alias = "info")]
    #[strum(to_string = "notice", serialize = "info")]
    Notice,
    #[serde(alias = "none")]
    #[strum(to_string = "off", serialize = "none")]
    Off,
}

impl Severity {
    /// Severity a rule runs with, `None` when the rule is turned off
    pub fn rule_severity(self) -> Option<gcplint_core::Severity> {
        match self {
            Severity::Error => Some(gcplint_core::Severity::Error),
            Severity::Warning => Some(gcplint_core::Severity::Warning),
            Severity::Notice => Some(gcplint_core::Severity::Notice),
            Severity::Off => None,
        }
    }
}

impl From<gcplint_core::Severity> for Severity {
    fn from(severity: gcplint_core::Severity) -> Self {
        match severity {
            gcplint_core::Severity::Error => Severity::Error,
            gcplint_core::Severity::Warning => Severity::Warning,
            gcplint_core::Severity::Notice => Severity::Notice,
        }
    }
}

/// Rule configuration from YAML file
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RuleConfig {
    /// Simple severity level (e.g., "error", "warning", "off")
    Severity(Severity),
    /// Full configuration with severity and options
    Full {
        severity: Severity,
        #[serde(default)]
        options: HashMap<String, serde_yml::Value>,
    },
}

impl RuleConfig {
    pub fn severity(&self) -> Severity {
        match self {
            RuleConfig::Severity(s) => *s,
            RuleConfig::Full { severity, .. } => *severity,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.severity() == Severity::Off
    }
}

/// Configuration file structure (.gcplint.yml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigFile {
    /// Base configuration to extend (e.g., "gcplint:recommended")
    #[serde(rename = "extends", skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    /// Rule configurations mapped by rule name
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,

    /// Paths to ignore during linting, relative to the module directory
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl ConfigFile {
    pub fn from_file(path: &Path) -> Result<Self, LinterError> {
        let content = fs::read_to_string(path).map_err(|e| LinterError::ConfigLoad {
            path: path.to_path_buf(),
            message: format!("Failed to read config file: {}", e),
        })?;

        let config: Self = serde_yml::from_str(&content).map_err(|e| LinterError::ConfigLoad {
            path: path.to_path_buf(),
            message: format!("Failed to parse YAML config: {}", e),
        })?;

        if let Some((pattern, e)) = config
            .ignore
            .iter()
            .find_map(|pattern| glob::Pattern::new(pattern).err().map(|e| (pattern, e)))
        {
            return Err(LinterError::ConfigLoad {
                path: path.to_path_buf(),
                message: format!("Invalid ignore pattern '{}': {}", pattern, e),
            });
        }

        Ok(config)
    }

    /// First default config file present in `dir`
    pub fn find_default(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_FILES.iter().map(|name| dir.join(name)).find(|path| path.exists())
    }

    /// Load from `config_path`, or from the default locations in the working
    /// directory. A missing explicit path is an error, a missing default is not.
    pub fn load(config_path: Option<&str>) -> Result<Option<(PathBuf, Self)>, LinterError> {
        let path = match config_path {
            Some(path) => PathBuf::from(path),
            None => match Self::find_default(Path::new(".")) {
                Some(path) => path,
                None => return Ok(None),
            },
        };
        let config = Self::from_file(&path)?;
        Ok(Some((path, config)))
    }

    /// Apply extends to get base configuration
    pub fn with_extends(&self) -> Self {
        let mut config = self.clone();

        if self.extends.as_deref() == Some(RECOMMENDED) {
            for (rule, rule_config) in Self::recommended().rules {
                config.rules.entry(rule).or_insert(rule_config);
            }
        }

        config
    }

    /// Every catalog rule at its default severity
    pub fn recommended() -> Self {
        let rules = all_rules()
            .into_iter()
            .map(|rule| {
                let severity = if rule.enabled() { rule.severity().into() } else { Severity::Off };
                (rule.name().to_string(), RuleConfig::Severity(severity))
            })
            .collect();

        Self { extends: None, rules, ignore: vec![] }
    }

    pub fn get_rule_config(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.rules.get(rule_name)
    }

    pub fn is_rule_disabled(&self, rule_name: &str) -> bool {
        self.get_rule_config(rule_name).map(|config| config.is_disabled()).unwrap_or(false)
    }

    /// Severity for a rule, `None` if the rule is disabled or not configured
    pub fn get_rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.get_rule_config(rule_name).map(|config| config.severity()).filter(|s| *s != Severity::Off)
    }

    /// Configured rule names missing from the catalog, sorted
    pub fn unknown_rules(&self) -> Vec<String> {
        let mut unknown: Vec<_> = self
            .rules
            .keys()
            .filter(|name| RuleId::from_str(name).is_err())
            .cloned()
            .collect();
        unknown.sort();
        unknown
    }

    /// Whether `relative_path` matches one of the ignore globs.
    ///
    /// Paths are relative to the module directory with `/` separators.
    pub fn is_ignored(&self, relative_path: &Path) -> bool {
        let path = relative_path.to_string_lossy().replace('\\', "/");
        let path = path.trim_start_matches("./");
        self.ignore.iter().any(|pattern| {
            glob::Pattern::new(pattern.trim_start_matches("./"))
                .ok()
                .map(|p| p.matches(path))
                .unwrap_or(false)
        })
    }
}

/// Rules selected for one run
#[derive(Debug, Clone)]
pub struct Ruleset {
    pub rules: Vec<Rule>,
}

impl Ruleset {
    pub fn enabled(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|rule| rule.enabled())
    }

    pub fn enabled_count(&self) -> usize {
        self.enabled().count()
    }
}

#[derive(Clone, Debug)]
pub struct LinterConfig {
    pub module_dir: PathBuf,
    pub format: Format,
    pub config_file: Option<ConfigFile>,
    pub config_path: Option<PathBuf>,
    pub only_rules: Vec<String>,
    pub enabled_rules: Vec<String>,
    pub disabled_rules: Vec<String>,
    pub cli_vars: Vec<String>,
    pub var_files: Vec<PathBuf>,
    pub force: bool,
}

impl LinterConfig {
    pub fn new(module_dir: impl Into<PathBuf>, format: Format) -> Self {
        Self { module_dir: module_dir.into(), format, ..Default::default() }
    }

    /// Attach the configuration file found at `config_path` or in the
    /// default locations, with `extends` applied
    pub fn with_config_file(mut self, config_path: Option<&str>) -> Result<Self, LinterError> {
        if let Some((path, config)) = ConfigFile::load(config_path)? {
            self.config_file = Some(config.with_extends());
            self.config_path = Some(path);
        }
        Ok(self)
    }

    pub fn is_rule_disabled(&self, rule_name: &str) -> bool {
        self.config_file.as_ref().map(|config| config.is_rule_disabled(rule_name)).unwrap_or(false)
    }

    pub fn get_rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.config_file.as_ref().and_then(|config| config.get_rule_severity(rule_name))
    }

    pub fn is_ignored(&self, relative_path: &Path) -> bool {
        self.config_file.as_ref().map(|config| config.is_ignored(relative_path)).unwrap_or(false)
    }

    /// Build the rules for this run.
    ///
    /// Catalog defaults, then the configuration file, then `--enable-rule`
    /// and `--disable-rule`. With `--only`, exactly the named rules run.
    pub fn ruleset(&self) -> Result<Ruleset, LinterError> {
        let only = parse_rule_names(&self.only_rules)?;
        let enable = parse_rule_names(&self.enabled_rules)?;
        let disable = parse_rule_names(&self.disabled_rules)?;

        let rules = all_rules()
            .into_iter()
            .map(|mut rule| {
                let name = rule.name();
                if let Some(config) = self.config_file.as_ref().and_then(|c| c.get_rule_config(name)) {
                    rule = match config.severity().rule_severity() {
                        Some(severity) => rule.with_enabled(true).with_severity(severity),
                        None => rule.with_enabled(false),
                    };
                }
                if enable.contains(&rule.id()) {
                    rule = rule.with_enabled(true);
                }
                if disable.contains(&rule.id()) {
                    rule = rule.with_enabled(false);
                }
                if !only.is_empty() {
                    let selected = only.contains(&rule.id());
                    rule = rule.with_enabled(selected);
                }
                rule
            })
            .collect();

        Ok(Ruleset { rules })
    }
}

fn parse_rule_names(names: &[String]) -> Result<Vec<RuleId>, LinterError> {
    names
        .iter()
        .map(|name| RuleId::from_str(name).map_err(|_| LinterError::UnknownRule(name.clone())))
        .collect()
}

impl Default for LinterConfig {
    fn default() -> Self {
        Self {
            module_dir: PathBuf::from("."),
            format: Format::Stylish,
            config_file: None,
            config_path: None,
            only_rules: vec![],
            enabled_rules: vec![],
            disabled_rules: vec![],
            cli_vars: vec![],
            var_files: vec![],
            force: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const ATTACHMENT: &str = "google_compute_interconnect_attachment_invalid_type";
    const GROUP: &str = "google_cloud_identity_group_invalid_initial_group_config";
    const IAM: &str = "google_project_iam_member_invalid_member";

    fn config_from(yaml: &str) -> ConfigFile {
        serde_yml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_config_file_not_found_is_error() {
        // Arrange - use nonexistent path
        let nonexistent_path = "/nonexistent/.gcplint.yml";

        // Act
        let result = ConfigFile::load(Some(nonexistent_path));

        // Assert
        match result {
            Err(LinterError::ConfigLoad { path, .. }) => {
                assert_eq!(path, PathBuf::from(nonexistent_path))
            }
            other => panic!("expected a config load error, got {:?}", other),
        }
    }

    #[test]
    fn test_config_file_malformed_yaml_error() {
        // Arrange - create temp file with invalid YAML
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "invalid: yaml: content: [[[").unwrap();

        // Act
        let result = ConfigFile::from_file(temp_file.path());

        // Assert
        let error_msg = result.unwrap_err().to_string();
        assert!(error_msg.contains("Failed to parse YAML"), "Error should mention YAML parsing: {}", error_msg);
    }

    #[test]
    fn test_config_extends_recommended() {
        // Arrange
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
extends: "gcplint:recommended"
rules:
  google_compute_interconnect_attachment_invalid_type: notice
"#
        )
        .unwrap();

        // Act
        let config = ConfigFile::from_file(temp_file.path()).unwrap();
        let config_with_extends = config.with_extends();

        // Assert
        assert_eq!(config.extends.as_deref(), Some(RECOMMENDED));
        assert_eq!(config_with_extends.rules.len(), all_rules().len());
        assert_eq!(config_with_extends.get_rule_severity(IAM), Some(Severity::Error));
        assert_eq!(config_with_extends.get_rule_severity(ATTACHMENT), Some(Severity::Notice));
    }

    #[test]
    fn test_config_rule_severity_aliases() {
        // Arrange
        let config = config_from(
            r#"
rules:
  google_compute_interconnect_attachment_invalid_type: warn
  google_cloud_identity_group_invalid_initial_group_config: none
  google_project_iam_member_invalid_member: info
"#,
        );

        // Assert
        assert_eq!(config.rules[ATTACHMENT].severity(), Severity::Warning);
        assert!(config.rules[GROUP].is_disabled());
        assert_eq!(config.rules[IAM].severity(), Severity::Notice);
    }

    #[test]
    fn test_config_full_rule_config_with_options() {
        // Arrange
        let config = config_from(
            r#"
rules:
  google_project_iam_member_invalid_member:
    severity: warning
    options:
      allow_deleted: false
"#,
        );

        // Act
        let rule = config.rules.get(IAM).unwrap();

        // Assert
        assert_eq!(rule.severity(), Severity::Warning);
        assert!(matches!(rule, RuleConfig::Full { options, .. } if options.contains_key("allow_deleted")));
    }

    #[test]
    fn test_severity_parses_aliases_from_str() {
        assert_eq!(Severity::from_str("warn").unwrap(), Severity::Warning);
        assert_eq!(Severity::from_str("info").unwrap(), Severity::Notice);
        assert_eq!(Severity::from_str("none").unwrap(), Severity::Off);
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Off.to_string(), "off");
    }

    #[test]
    fn test_unknown_rules_are_listed() {
        let config = config_from(
            r#"
rules:
  google_compute_interconnect_attachment_invalid_type: error
  made_up_rule: warning
  another_one: off
"#,
        );

        assert_eq!(config.unknown_rules(), vec!["another_one".to_string(), "made_up_rule".to_string()]);
    }

    #[test]
    fn test_ignore_patterns_are_globs() {
        // Arrange
        let config = config_from(
            r#"
ignore:
  - "modules/legacy/**"
  - "*_generated.tf"
  - "**/legacy.tf"
  - "**/deprecated/**"
  - "./network.tf"
"#,
        );

        // Assert
        assert!(config.is_ignored(Path::new("modules/legacy/main.tf")));
        assert!(config.is_ignored(Path::new("dns_generated.tf")));
        assert!(config.is_ignored(Path::new("./dns_generated.tf")));
        assert!(config.is_ignored(Path::new("legacy.tf")));
        assert!(config.is_ignored(Path::new("deprecated/main.tf")));
        assert!(config.is_ignored(Path::new("network.tf")));
        assert!(!config.is_ignored(Path::new("main.tf")));
        assert!(!config.is_ignored(Path::new("generated.tf")));
        assert!(!config.is_ignored(Path::new("network.tfx")));
    }

    #[test]
    fn test_plain_ignore_entry_matches_whole_name() {
        let config = config_from("ignore:\n  - \"main.tf\"\n");

        assert!(config.is_ignored(Path::new("main.tf")));
        assert!(!config.is_ignored(Path::new("main.tfx")));
        assert!(!config.is_ignored(Path::new("main.tf.bak")));
    }

    #[test]
    fn test_config_file_invalid_ignore_pattern_error() {
        // Arrange
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "ignore:\n  - \"modules/[legacy\"").unwrap();

        // Act
        let result = ConfigFile::from_file(temp_file.path());

        // Assert
        match result {
            Err(LinterError::ConfigLoad { message, .. }) => {
                assert!(message.contains("Invalid ignore pattern"), "{}", message)
            }
            other => panic!("expected a config load error, got {:?}", other),
        }
    }

    #[test]
    fn test_ruleset_defaults_enable_every_rule() {
        let ruleset = LinterConfig::default().ruleset().unwrap();

        assert_eq!(ruleset.enabled_count(), all_rules().len());
        assert!(ruleset.enabled().all(|rule| rule.severity() == gcplint_core::Severity::Error));
    }

    #[test]
    fn test_ruleset_applies_config_then_cli() {
        // Arrange
        let mut config = LinterConfig::default();
        config.config_file = Some(config_from(
            r#"
rules:
  google_compute_interconnect_attachment_invalid_type: warning
  google_cloud_identity_group_invalid_initial_group_config: off
  google_project_iam_member_invalid_member: error
"#,
        ));
        config.enabled_rules = vec![GROUP.to_string()];
        config.disabled_rules = vec![IAM.to_string()];

        // Act
        let ruleset = config.ruleset().unwrap();
        let find = |name: &str| ruleset.rules.iter().find(|rule| rule.name() == name).cloned().unwrap();

        // Assert
        assert!(find(ATTACHMENT).enabled());
        assert_eq!(find(ATTACHMENT).severity(), gcplint_core::Severity::Warning);
        assert!(find(GROUP).enabled(), "--enable-rule wins over the config file");
        assert!(!find(IAM).enabled(), "--disable-rule wins over the config file");
    }

    #[test]
    fn test_ruleset_only_selects_named_rules() {
        let config = LinterConfig { only_rules: vec![IAM.to_string()], ..Default::default() };

        let ruleset = config.ruleset().unwrap();
        let names: Vec<_> = ruleset.enabled().map(|rule| rule.name()).collect();

        assert_eq!(names, vec![IAM]);
    }

    #[test]
    fn test_ruleset_rejects_unknown_cli_rule() {
        let config = LinterConfig { disabled_rules: vec!["no_such_rule".to_string()], ..Default::default() };

        match config.ruleset() {
            Err(LinterError::UnknownRule(name)) => assert_eq!(name, "no_such_rule"),
            other => panic!("expected unknown rule error, got {:?}", other),
        }
    }

    #[test]
    fn test_linter_config_rule_disabled_check() {
        // Arrange
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(".gcplint.yml");
        std::fs::write(
            &config_path,
            r#"
rules:
  google_cloud_identity_group_invalid_initial_group_config: off
  google_compute_interconnect_attachment_invalid_type: warning
"#,
        )
        .unwrap();

        // Act
        let config = LinterConfig::new(temp_dir.path(), Format::Json)
            .with_config_file(config_path.to_str())
            .unwrap();

        // Assert
        assert_eq!(config.config_path.as_deref(), Some(config_path.as_path()));
        assert!(config.is_rule_disabled(GROUP));
        assert!(!config.is_rule_disabled(ATTACHMENT));
        assert_eq!(config.get_rule_severity(ATTACHMENT), Some(Severity::Warning));
        assert_eq!(config.get_rule_severity("undefined_rule"), None);
    }

    #[test]
    fn test_find_default_prefers_yml() {
        // Arrange
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(".gcplint.yaml"), "rules: {}\n").unwrap();
        std::fs::write(temp_dir.path().join(".gcplint.yml"), "rules: {}\n").unwrap();

        // Act
        let found = ConfigFile::find_default(temp_dir.path());

        // Assert
        assert_eq!(found, Some(temp_dir.path().join(".gcplint.yml")));
    }
}
