//! Check command implementation.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use csguard_core::ViolationReport;

use super::setup;
use crate::{OutputFormat, ProjectArgs};

/// Exit code when the report cannot be written.
const EXIT_REPORT_WRITE_FAILED: u8 = 2;

/// Options of `csguard check`.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Project selection and filters.
    pub project: ProjectArgs,
    /// Where to write the XML report.
    pub report_path: Option<PathBuf>,
    /// Fail when critical violations are present.
    pub fail_on_critical: bool,
    /// Force self-qualifier and file-organization rules to error.
    pub enforce_enhanced_standards: bool,
    /// Console output format.
    pub format: OutputFormat,
}

/// Runs the check command.
pub fn run(options: &CheckOptions) -> Result<ExitCode> {
    let project = &options.project;
    let config = setup::load_config(project);
    let analyzer = setup::build_analyzer(project, config, options.enforce_enhanced_standards)?;

    tracing::info!(
        "Analyzing {} with {} rules",
        project.project_path.display(),
        analyzer.rule_count()
    );

    let result = analyzer.analyze().context("Analysis failed")?;
    super::output::print(&result, options.format, analyzer.root())?;

    let report =
        ViolationReport::from_result(project_name(analyzer.root()), &result, options.fail_on_critical);

    if let Some(path) = &options.report_path {
        if let Err(e) = report.write_xml(path) {
            tracing::error!("{e}");
            return Ok(ExitCode::from(EXIT_REPORT_WRITE_FAILED));
        }
        tracing::info!("Report written to {}", path.display());
    }

    tracing::info!(
        "Build status: {} ({} critical, {} warnings)",
        report.summary.build_status.label(),
        report.summary.critical,
        report.summary.warnings
    );
    Ok(ExitCode::from(report.exit_code()))
}

/// Name of the project directory, used in the report header.
fn project_name(root: &std::path::Path) -> String {
    let canonical = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    canonical
        .file_name()
        .map_or_else(|| "project".to_string(), |n| n.to_string_lossy().into_owned())
}
