//! Init command implementation.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use csguard_core::Configuration;

const CONFIG_NAME: &str = "csguard.json";

/// Writes the default configuration into `project_dir`.
pub fn run(project_dir: &Path, force: bool) -> Result<ExitCode> {
    let config_path = project_dir.join(CONFIG_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let json = Configuration::default()
        .to_json()
        .context("Failed to serialize default configuration")?;
    std::fs::write(&config_path, json + "\n")
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to configure the analyzers");
    println!("  2. Run: csguard check");

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_loadable_defaults_and_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        run(dir.path(), false).unwrap();

        let written = Configuration::from_file(&dir.path().join(CONFIG_NAME)).unwrap();
        assert_eq!(written, Configuration::default());

        assert!(run(dir.path(), false).is_err());
        assert!(run(dir.path(), true).is_ok());
    }
}
