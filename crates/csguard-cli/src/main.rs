//! csguard CLI tool.
//!
//! Usage:
//! ```bash
//! csguard check --project-path <PATH> [--report-path <FILE>] [--fail-on-critical <BOOL>]
//! csguard fix [--rules <CODES>] [--dry-run]
//! csguard list-rules
//! csguard init
//! ```
//!
//! Exit codes: `0` success, `1` failed on critical violations, `2` the report
//! could not be written, `3` any other error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Exit code for unrecoverable errors.
const EXIT_OTHER_ERROR: u8 = 3;

/// Coding-standards analyzer for C# projects
#[derive(Parser)]
#[command(name = "csguard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by commands that analyze a project.
#[derive(clap::Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Project root to analyze
    #[arg(long, default_value = ".", env = "CSGUARD_PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Path to the JSON configuration file
    #[arg(long, env = "CSGUARD_CONFIG_PATH")]
    pub config_path: Option<PathBuf>,

    /// Only run specific rules (comma-separated codes or names)
    #[arg(long)]
    pub rules: Option<String>,

    /// Exclude patterns relative to the project root (can be repeated)
    #[arg(short, long)]
    pub exclude: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the standards checks and write the report
    Check {
        #[command(flatten)]
        project: ProjectArgs,

        /// Where to write the XML report
        #[arg(long)]
        report_path: Option<PathBuf>,

        /// Fail the build when critical violations are found
        #[arg(long, action = ArgAction::Set, default_value_t = true)]
        fail_on_critical: bool,

        /// Force self-qualifier and file-organization rules to error
        #[arg(long)]
        enforce_enhanced_standards: bool,

        /// Console output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Apply available code fixes one at a time
    Fix {
        #[command(flatten)]
        project: ProjectArgs,

        /// Show the edits without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// List available rules
    ListRules,

    /// Write a default configuration file
    Init {
        /// Directory to write `csguard.json` into
        #[arg(long, default_value = ".")]
        project_path: PathBuf,

        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with source snippets.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let outcome = match cli.command {
        Commands::Check {
            project,
            report_path,
            fail_on_critical,
            enforce_enhanced_standards,
            format,
        } => commands::check::run(&commands::check::CheckOptions {
            project,
            report_path,
            fail_on_critical,
            enforce_enhanced_standards,
            format,
        }),
        Commands::Fix { project, dry_run } => commands::fix::run(&project, dry_run),
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init {
            project_path,
            force,
        } => commands::init::run(&project_path, force),
    };

    outcome.unwrap_or_else(|e| {
        eprintln!("error: {e:#}");
        ExitCode::from(EXIT_OTHER_ERROR)
    })
}
