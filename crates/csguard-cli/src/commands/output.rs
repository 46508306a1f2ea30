//! Console formatting for lint results.

use std::path::Path;

use anyhow::Result;
use csguard_core::{LintResult, Violation, ViolationDiagnostic};
use miette::{NamedSource, Report};

use crate::OutputFormat;

/// Print lint results in the specified format.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result, root),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
    }
    Ok(())
}

/// Renders a violation with its source snippet, or plain text when the file
/// cannot be read or the location has no span.
fn render(violation: &Violation, root: &Path) -> String {
    let file = &violation.location.file;
    let source = (violation.location.length > 0)
        .then(|| std::fs::read_to_string(root.join(file)).ok())
        .flatten();
    match source {
        Some(text) => {
            let report = Report::new(ViolationDiagnostic::from(violation))
                .with_source_code(NamedSource::new(file.display().to_string(), text));
            format!("{report:?}")
        }
        None => violation.format(),
    }
}

fn print_text(result: &LintResult, root: &Path) {
    let (errors, warnings) = result.count_by_severity();

    for violation in &result.violations {
        println!("{}", render(violation, root));
    }

    let fixable = result.violations.iter().filter(|v| v.fixable).count();
    println!(
        "Found {errors} error(s), {warnings} warning(s) in {} file(s)",
        result.files_checked
    );
    if result.files_failed > 0 {
        println!("{} file(s) could not be parsed", result.files_failed);
    }
    if fixable > 0 {
        println!("{fixable} violation(s) can be fixed with `csguard fix`");
    }
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for violation in &result.violations {
        println!("{violation}");
    }
}
