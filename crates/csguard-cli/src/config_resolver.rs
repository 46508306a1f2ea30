//! Settings document discovery.
//!
//! Lookup order:
//!
//! 1. `--config-path` (explicit path)
//! 2. `<project>/csguard.json`, then `<project>/.csguard.json`
//! 3. `$CSGUARD_CONFIG_DIR/config.json`, else `~/.csguard/config.json`
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use csguard_core::Configuration;

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given on the command line.
    Explicit(PathBuf),
    /// Found in the project root.
    Project(PathBuf),
    /// Found in the user-wide config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Resolved document path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Loads the configuration.
    ///
    /// A missing or malformed document is logged and replaced by defaults.
    #[must_use]
    pub fn load(&self) -> Configuration {
        match self {
            Self::Default => {
                tracing::debug!("No configuration found; using built-in defaults");
                Configuration::default()
            }
            Self::Global(p) => {
                tracing::info!("Using global config: {}", p.display());
                Configuration::load_or_default(p)
            }
            Self::Explicit(p) | Self::Project(p) => {
                tracing::debug!("Using config: {}", p.display());
                Configuration::load_or_default(p)
            }
        }
    }
}

/// Project-level document names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["csguard.json", ".csguard.json"];

/// Document name inside the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.json";

/// Resolves the settings document for `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.is_file())
    {
        return ConfigSource::Project(found);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, ConfigSource::Global)
}

/// `$CSGUARD_CONFIG_DIR`, else `~/.csguard/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("CSGUARD_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".csguard"))
}
