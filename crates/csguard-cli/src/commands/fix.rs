//! Fix command implementation.

use std::process::ExitCode;

use anyhow::{Context, Result};

use super::setup;
use crate::ProjectArgs;

/// Runs the fix command.
///
/// `--rules` both limits which analyzers run and which fixes apply.
pub fn run(project: &ProjectArgs, dry_run: bool) -> Result<ExitCode> {
    let config = setup::load_config(project);
    let analyzer = setup::build_analyzer(project, config, false)?;

    let only: Vec<String> = project
        .rules
        .as_deref()
        .map(|f| {
            f.split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let summary = analyzer
        .apply_fixes(&only, dry_run)
        .context("Applying fixes failed")?;

    for edit in &summary.edits {
        println!("{}: {}", edit.file.display(), edit.description);
    }
    let verb = if dry_run { "Would apply" } else { "Applied" };
    println!(
        "{verb} {} fix(es) in {} file(s)",
        summary.edits.len(),
        summary.files_changed
    );
    Ok(ExitCode::SUCCESS)
}
