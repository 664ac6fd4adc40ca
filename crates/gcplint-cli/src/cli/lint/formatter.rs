//! Output formatting for lint results

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io::{self, Write};

use clap::ValueEnum;
use colored::Colorize;
use gcplint_core::{Diagnostic, DiagnosticLevel, ValidationResult};
use strum::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    Stylish,
    Compact,
    Json,
    Quickfix,
    Doc,
}

pub trait OutputFormatter {
    fn format(&self, result: &ValidationResult, out: &mut dyn Write) -> io::Result<()>;
}

/// `sources` maps file names to their content, for formats that print source
pub fn get_formatter(format: Format, sources: HashMap<String, String>) -> Box<dyn OutputFormatter> {
    match format {
        Format::Stylish => Box::new(StylishFormatter),
        Format::Compact => Box::new(CompactFormatter),
        Format::Json => Box::new(JsonFormatter),
        Format::Quickfix => Box::new(QuickfixFormatter),
        Format::Doc => Box::new(DocumentationFormatter { sources }),
    }
}

struct StylishFormatter;

impl OutputFormatter for StylishFormatter {
    fn format(&self, result: &ValidationResult, out: &mut dyn Write) -> io::Result<()> {
        let total = result.total();

        if total == 0 {
            return writeln!(out, "{}", "✓ No issues found!".green());
        }

        writeln!(out, "{}", format!("Found {} issue(s):", total).red().bold())?;

        for diagnostic in result.iter() {
            let label = format!("{}:", diagnostic.level);
            let label = match diagnostic.level {
                DiagnosticLevel::Error => label.red().bold(),
                DiagnosticLevel::Warning => label.yellow().bold(),
                DiagnosticLevel::Note => label.blue().bold(),
            };
            let code = diagnostic.code.as_deref().map(|c| format!(" ({})", c)).unwrap_or_default();
            writeln!(
                out,
                "  {} {}{} {}",
                label,
                diagnostic.message,
                code,
                format_location(diagnostic).dimmed()
            )?;

            if let Some(ref link) = diagnostic.documentation {
                writeln!(out, "    {}", link.dimmed())?;
            }
        }
        Ok(())
    }
}

struct CompactFormatter;

impl OutputFormatter for CompactFormatter {
    fn format(&self, result: &ValidationResult, out: &mut dyn Write) -> io::Result<()> {
        for diagnostic in result.iter() {
            writeln!(
                out,
                "{}:{}:{}: {} - {}{}",
                diagnostic.file.as_deref().unwrap_or(""),
                diagnostic.line.unwrap_or(1),
                diagnostic.column.unwrap_or(1),
                diagnostic.level,
                diagnostic.message,
                diagnostic.code.as_deref().map(|c| format!(" ({})", c)).unwrap_or_default()
            )?;
        }
        Ok(())
    }
}

struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &ValidationResult, out: &mut dyn Write) -> io::Result<()> {
        let issues = |list: &[Diagnostic]| {
            list.iter()
                .map(|d| {
                    serde_json::json!({
                        "rule": d.code,
                        "message": d.message,
                        "file": d.file,
                        "line": d.line,
                        "column": d.column,
                        "span": d.span,
                        "link": d.documentation,
                    })
                })
                .collect::<Vec<_>>()
        };
        let output = serde_json::json!({
            "errors": issues(&result.errors),
            "warnings": issues(&result.warnings),
            "notices": issues(&result.notices),
        });

        let json = serde_json::to_string_pretty(&output).map_err(io::Error::other)?;
        writeln!(out, "{}", json)
    }
}

struct QuickfixFormatter;

impl OutputFormatter for QuickfixFormatter {
    fn format(&self, result: &ValidationResult, out: &mut dyn Write) -> io::Result<()> {
        for diagnostic in result.iter() {
            let kind = match diagnostic.level {
                DiagnosticLevel::Error => "E",
                DiagnosticLevel::Warning => "W",
                DiagnosticLevel::Note => "I",
            };
            writeln!(
                out,
                "{}:{}:{}: {}: {}",
                diagnostic.file.as_deref().unwrap_or(""),
                diagnostic.line.unwrap_or(1),
                diagnostic.column.unwrap_or(1),
                kind,
                diagnostic.message
            )?;
        }
        Ok(())
    }
}

fn format_location(diagnostic: &Diagnostic) -> String {
    let file = diagnostic.file.as_deref().unwrap_or("");
    match (diagnostic.line, diagnostic.column) {
        (Some(l), Some(c)) => format!("{}:{}:{}", file, l, c),
        (Some(l), None) => format!("{}:{}", file, l),
        _ => file.to_string(),
    }
}

/// Renders the source around each issue with carets under the offending
/// expression.
///
/// ```text
/// main.tf:
///
///   8 │ resource "google_project_iam_member" "beta" {
///   9 │   project = "my-project"
///  10 │   member  = "user:"
///     │             ^^^^^^^ error: user: is an invalid member format
///  11 │ }
/// ```
struct DocumentationFormatter {
    sources: HashMap<String, String>,
}

impl OutputFormatter for DocumentationFormatter {
    fn format(&self, result: &ValidationResult, out: &mut dyn Write) -> io::Result<()> {
        let mut issues_by_file: BTreeMap<&str, Vec<&Diagnostic>> = BTreeMap::new();
        for diagnostic in result.iter() {
            issues_by_file.entry(diagnostic.file.as_deref().unwrap_or("")).or_default().push(diagnostic);
        }

        for (file_path, mut issues) in issues_by_file {
            issues.sort_by_key(|issue| (issue.line.unwrap_or(0), issue.column.unwrap_or(0)));

            writeln!(out, "\n{}:\n", file_path)?;

            let source = match self.sources.get(file_path) {
                Some(source) => source.clone(),
                None => match fs::read_to_string(file_path) {
                    Ok(content) => content,
                    Err(_) => {
                        for issue in issues {
                            writeln!(
                                out,
                                "   {} {} {}",
                                format!("{}:", issue.level).red().bold(),
                                issue.message,
                                format_location(issue).dimmed()
                            )?;
                        }
                        continue;
                    }
                },
            };

            render_source_with_issues(&source, &issues, out)?;
        }

        let total = result.total();
        if total == 0 {
            writeln!(out, "\n{}", "✓ No issues found!".green())
        } else {
            writeln!(out, "\n{} issue(s) found", total)
        }
    }
}

fn render_source_with_issues(source: &str, issues: &[&Diagnostic], out: &mut dyn Write) -> io::Result<()> {
    let lines: Vec<&str> = source.lines().collect();
    let max_line_num = lines.len();
    let line_num_width = format!("{}", max_line_num).len();

    let mut issues_by_line: HashMap<usize, Vec<&Diagnostic>> = HashMap::new();
    for issue in issues {
        if let Some(line) = issue.line {
            issues_by_line.entry(line).or_default().push(*issue);
        }
    }

    // two lines of context on each side
    let mut lines_to_show = HashSet::new();
    for &issue_line in issues_by_line.keys() {
        for line in issue_line.saturating_sub(2)..=(issue_line + 2).min(max_line_num) {
            lines_to_show.insert(line);
        }
    }

    let mut prev_line = 0;
    for (idx, line_text) in lines.iter().enumerate() {
        let line_num = idx + 1;

        if !lines_to_show.contains(&line_num) {
            continue;
        }

        if line_num > prev_line + 1 && prev_line > 0 {
            writeln!(out, "{:>width$} ⋮", "", width = line_num_width + 3)?;
        }
        prev_line = line_num;

        writeln!(out, " {:>width$} │ {}", line_num, line_text, width = line_num_width)?;

        let Some(line_issues) = issues_by_line.get(&line_num) else {
            continue;
        };
        for issue in line_issues {
            let annotation = match issue.column {
                Some(col) => {
                    let padding = " ".repeat(col.saturating_sub(1));
                    let carets = "^".repeat(caret_width(issue, line_text, col));
                    format!(
                        " {:>width$} │ {}{} {}: {}",
                        "",
                        padding,
                        carets,
                        issue.level,
                        issue.message,
                        width = line_num_width
                    )
                }
                None => format!(
                    " {:>width$} │ {}: {}",
                    "",
                    issue.level,
                    issue.message,
                    width = line_num_width
                ),
            };

            let annotation = match issue.level {
                DiagnosticLevel::Error => annotation.red(),
                DiagnosticLevel::Warning => annotation.yellow(),
                DiagnosticLevel::Note => annotation.blue(),
            };
            writeln!(out, "{}", annotation)?;
        }
    }
    Ok(())
}

/// Width of the underline: the span width on one line, otherwise up to the
/// end of the first line
fn caret_width(issue: &Diagnostic, line_text: &str, col: usize) -> usize {
    let to_line_end = line_text.chars().count().saturating_sub(col.saturating_sub(1)).max(1);
    match issue.span.as_ref().and_then(|span| span.width()) {
        Some(width) => width,
        None => to_line_end,
    }
}
