use std::fs;
use std::path::Path;

use clap::Parser;
use gcplint_cli::cli::lint::{self, Format, LinterConfig, Linter, LinterError, EXIT_FAILURE, EXIT_ISSUES, EXIT_OK};
use gcplint_cli::cli::{Context, Opts};
use gcplint_core::DiagnosticLevel;
use tempfile::TempDir;

const MAIN_TF: &str = r#"resource "google_project_iam_member" "alpha" {
  project = "my-project"
  role    = "roles/viewer"
  member  = "user:alice@example.com"
}

resource "google_project_iam_member" "beta" {
  project = "my-project"
  role    = "roles/viewer"
  member  = "users:bob@example.com"
}

resource "google_project_iam_member" "gamma" {
  project = "my-project"
  role    = "roles/viewer"
}

resource "google_compute_region_backend_service" "api" {
  name     = "api"
  protocol = var.protocol
}

resource "google_compute_interconnect_attachment" "onprem" {
  name   = "onprem"
  router = google_compute_router.main.id
  type   = "${var.attachment_type}"
}
"#;

const VARIABLES_TF: &str = r#"variable "protocol" {
  type    = string
  default = "FTP"
}

variable "attachment_type" {
  type = string
}
"#;

fn module_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

fn lint_dir(config: &LinterConfig) -> lint::LintReport {
    Linter::new(config).lint(&Context::empty()).unwrap()
}

fn opts(dir: &Path, extra: &[&str]) -> Opts {
    let mut args = vec!["gcplint".to_string(), "--format".to_string(), "compact".to_string()];
    args.extend(extra.iter().map(|arg| arg.to_string()));
    args.push(dir.display().to_string());
    Opts::try_parse_from(args).unwrap()
}

#[test]
fn test_module_findings_at_expression_ranges() {
    // Arrange
    let dir = module_dir(&[("main.tf", MAIN_TF), ("variables.tf", VARIABLES_TF)]);
    let config = LinterConfig::new(dir.path(), Format::Json);

    // Act
    let report = lint_dir(&config);

    // Assert
    assert!(report.failures.is_empty(), "{:?}", report.failures);
    let messages: Vec<_> = report.result.iter().map(|d| (d.message.as_str(), d.line, d.column)).collect();
    assert_eq!(
        messages,
        vec![
            ("users:bob@example.com is an invalid member format", Some(10), Some(13)),
            (
                "expected protocol to be one of [\"HTTP\" \"HTTPS\" \"HTTP2\" \"SSL\" \"TCP\" \"UDP\" \"GRPC\" \"UNSPECIFIED\" \"\"], got FTP",
                Some(20),
                Some(14),
            ),
        ]
    );
    assert!(report.result.errors.iter().all(|d| d.file.as_deref().unwrap_or("").ends_with("main.tf")));
    assert_eq!(report.exit_code(false), EXIT_ISSUES);
}

#[test]
fn test_tfvars_and_cli_vars_feed_evaluation() {
    // Arrange
    let dir = module_dir(&[
        ("main.tf", MAIN_TF),
        ("variables.tf", VARIABLES_TF),
        ("terraform.tfvars", "protocol = \"HTTPS\"\n"),
    ]);
    let mut config = LinterConfig::new(dir.path(), Format::Json);
    config.cli_vars = vec!["attachment_type=HOSTED".to_string()];

    // Act
    let report = lint_dir(&config);

    // Assert
    let rules: Vec<_> = report.result.iter().filter_map(|d| d.code.as_deref()).collect();
    assert_eq!(
        rules,
        vec!["google_project_iam_member_invalid_member", "google_compute_interconnect_attachment_invalid_type"]
    );
    let attachment = &report.result.errors[1];
    assert_eq!(
        attachment.message,
        "expected type to be one of [\"DEDICATED\" \"PARTNER\" \"PARTNER_PROVIDER\" \"\"], got HOSTED"
    );
}

#[test]
fn test_undeclared_variable_is_reported_as_failure() {
    // Arrange
    let dir = module_dir(&[(
        "main.tf",
        "resource \"google_compute_interconnect_attachment\" \"onprem\" {\n  type = var.missing\n}\n\nresource \"google_cloud_identity_group\" \"admins\" {\n  initial_group_config = \"OWNER\"\n}\n",
    )]);
    let config = LinterConfig::new(dir.path(), Format::Json);

    // Act
    let report = lint_dir(&config);

    // Assert
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].rule, "google_compute_interconnect_attachment_invalid_type");
    assert_eq!(report.result.error_count(), 1, "other rules still run");
    assert_eq!(report.exit_code(true), EXIT_FAILURE);
}

#[test]
fn test_config_file_severity_and_ignore() {
    // Arrange
    let dir = module_dir(&[
        ("main.tf", MAIN_TF),
        ("variables.tf", VARIABLES_TF),
        ("groups_generated.tf", "resource \"google_cloud_identity_group\" \"old\" {\n  initial_group_config = \"OWNER\"\n}\n"),
    ]);
    let config_path = dir.path().join("lint.yml");
    fs::write(
        &config_path,
        r#"
extends: "gcplint:recommended"
rules:
  google_project_iam_member_invalid_member: warning
  google_compute_region_backend_service_invalid_protocol: off
ignore:
  - "*_generated.tf"
"#,
    )
    .unwrap();
    let config = LinterConfig::new(dir.path(), Format::Json)
        .with_config_file(config_path.to_str())
        .unwrap();

    // Act
    let report = lint_dir(&config);

    // Assert
    assert_eq!(report.result.error_count(), 0);
    assert_eq!(report.result.warning_count(), 1);
    assert_eq!(report.result.warnings[0].level, DiagnosticLevel::Warning);
    assert!(!report.sources.keys().any(|name| name.contains("groups_generated.tf")));
}

#[test]
fn test_run_lint_exit_codes() {
    let dir = module_dir(&[("main.tf", MAIN_TF), ("variables.tf", VARIABLES_TF)]);
    let ctx = Context::empty();

    assert_eq!(lint::run_lint(&opts(dir.path(), &[]), &ctx).unwrap(), EXIT_ISSUES);
    assert_eq!(lint::run_lint(&opts(dir.path(), &["--force"]), &ctx).unwrap(), EXIT_OK);
    assert_eq!(
        lint::run_lint(
            &opts(dir.path(), &["--var", "protocol=TCP", "--disable-rule", "google_project_iam_member_invalid_member"]),
            &ctx
        )
        .unwrap(),
        EXIT_OK
    );
}

#[test]
fn test_run_lint_rejects_bad_arguments() {
    let dir = module_dir(&[("main.tf", MAIN_TF), ("variables.tf", VARIABLES_TF)]);
    let ctx = Context::empty();

    let err = lint::run_lint(&opts(dir.path(), &["--var", "protocol"]), &ctx).unwrap_err();
    assert!(matches!(err, LinterError::InvalidVariable(_)));

    let err = lint::run_lint(&opts(dir.path(), &["--only", "no_such_rule"]), &ctx).unwrap_err();
    assert!(matches!(err, LinterError::UnknownRule(_)));
}
