//! Shared output formatting for run reports.

use anyhow::Result;
use miette::{NamedSource, Report};
use polylint_core::{Diagnostic, DiagnosticReport, FailureKind, RunReport, Severity};
use serde::Serialize;
use std::path::Path;

use super::check::Sources;
use crate::OutputFormat;

/// Print a run report in the specified format.
pub fn print(report: &RunReport, format: OutputFormat, sources: &Sources) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report, sources),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

/// Renders a diagnostic with a source snippet when the text covers its span.
fn render(diagnostic: &Diagnostic, sources: &Sources) -> String {
    match sources.get(&diagnostic.file) {
        Some(text) if diagnostic.span.end <= text.len() => {
            let named = NamedSource::new(diagnostic.file.display().to_string(), text.clone());
            let report = Report::new(DiagnosticReport::from(diagnostic)).with_source_code(named);
            format!("{report:?}")
        }
        _ => diagnostic.format(),
    }
}

fn print_text(report: &RunReport, sources: &Sources) {
    print!("{}", text(report, sources));
}

fn text(report: &RunReport, sources: &Sources) -> String {
    let mut out = String::new();
    for batch in report.batches() {
        out.push_str(&format!(
            "\x1b[1m{}\x1b[0m ({})\n",
            batch.file().display(),
            batch.diagnostics.len()
        ));
        for diagnostic in &batch.diagnostics {
            out.push_str(&render(diagnostic, sources));
            out.push('\n');
        }
    }
    for failure in &report.failures {
        out.push_str(&format!(
            "\x1b[31mfailed\x1b[0m {}: {}\n",
            failure.file.display(),
            failure.message
        ));
    }

    let errors = report.count_by_severity(Severity::Error);
    let warnings = report.count_by_severity(Severity::Warning);
    let infos = report.count_by_severity(Severity::Info);

    let summary_color = if errors > 0 || !report.failures.is_empty() {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    out.push_str(&format!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s)\x1b[0m\n",
        summary_color, errors, warnings, infos, report.files_checked
    ));
    out
}

#[derive(Serialize)]
struct JsonFailure<'a> {
    file: &'a Path,
    kind: FailureKind,
    message: &'a str,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    diagnostics: &'a [Diagnostic],
    failures: Vec<JsonFailure<'a>>,
    files_checked: usize,
    cancelled: usize,
}

impl<'a> From<&'a RunReport> for JsonReport<'a> {
    fn from(report: &'a RunReport) -> Self {
        Self {
            diagnostics: &report.diagnostics,
            failures: report
                .failures
                .iter()
                .map(|f| JsonFailure {
                    file: &f.file,
                    kind: f.kind,
                    message: &f.message,
                })
                .collect(),
            files_checked: report.files_checked,
            cancelled: report.cancelled,
        }
    }
}

fn print_json(report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(&JsonReport::from(report))?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &RunReport) {
    for diagnostic in &report.diagnostics {
        println!("{diagnostic}");
    }
}
