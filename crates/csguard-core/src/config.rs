//! Configuration model for csguard.
//!
//! The settings document is JSON with one section per analyzer. Every field
//! has a built-in default, and a section that fails to deserialize falls back
//! to its defaults with a logged warning instead of aborting the run. A loaded
//! [`Configuration`] is never mutated; reloading produces a new value.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::catalog::RuleDescriptor;
use crate::types::Severity;

/// Declaration kinds that can be mapped to a required folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclarationKind {
    /// `interface IFoo`
    Interface,
    /// `abstract class Foo`
    AbstractClass,
    /// Any non-abstract `class`.
    Class,
    /// `struct Foo`
    Struct,
    /// `enum Foo`
    Enum,
    /// `record Foo` / `record struct Foo`
    Record,
    /// `delegate void Foo()`
    Delegate,
}

impl DeclarationKind {
    /// Human-readable label used in messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Interface => "Interface",
            Self::AbstractClass => "Abstract class",
            Self::Class => "Class",
            Self::Struct => "Struct",
            Self::Enum => "Enum",
            Self::Record => "Record",
            Self::Delegate => "Delegate",
        }
    }
}

/// Top-level configuration for csguard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    /// File discovery settings.
    pub source_loader: SourceLoaderConfig,
    /// Orchestrator settings.
    pub analyzer: AnalyzerConfig,
    /// Folder-structure analyzer settings.
    pub folder_structure: FolderStructureConfig,
    /// Method-region settings.
    pub method_regions: MethodRegionsConfig,
    /// Class-region settings.
    pub class_regions: ClassRegionsConfig,
    /// Documentation-completeness settings.
    pub xml_documentation: XmlDocumentationConfig,
    /// Self-qualifier settings.
    pub this_qualifier: ThisQualifierConfig,
    /// File-organization settings.
    pub class_file_organization: ClassFileOrganizationConfig,
    /// Per-rule overrides keyed by rule code or name.
    pub rules: BTreeMap<String, RuleConfig>,
}

impl Configuration {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON object.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Loads configuration from `path`, falling back to defaults on any error.
    ///
    /// This is the run-time entry point: a broken settings document never
    /// stops validation.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{e}; using built-in defaults");
                Self::default()
            }
        }
    }

    /// Parses configuration from a JSON string.
    ///
    /// Sections are deserialized independently: a malformed section is
    /// replaced by its defaults and reported through `tracing`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or not an object.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse {
                message: e.to_string(),
            })?;
        let serde_json::Value::Object(root) = value else {
            return Err(ConfigError::Parse {
                message: "top-level value must be an object".to_string(),
            });
        };

        Ok(Self {
            source_loader: section(&root, "sourceLoader"),
            analyzer: section(&root, "analyzer"),
            folder_structure: section(&root, "folderStructure"),
            method_regions: section(&root, "methodRegions"),
            class_regions: section(&root, "classRegions"),
            xml_documentation: section(&root, "xmlDocumentation"),
            this_qualifier: section(&root, "thisQualifier"),
            class_file_organization: section(&root, "classFileOrganization"),
            rules: section(&root, "rules"),
        })
    }

    /// Serializes the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Override for a rule; a key naming the code wins over one naming the
    /// rule name.
    fn rule_config(&self, descriptor: &RuleDescriptor) -> Option<&RuleConfig> {
        let by = |key: &str| {
            self.rules
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, c)| c)
        };
        by(descriptor.code).or_else(|| by(descriptor.name))
    }

    /// Checks if a rule is enabled by the per-rule overrides.
    #[must_use]
    pub fn is_rule_enabled(&self, descriptor: &RuleDescriptor) -> bool {
        self.rule_config(descriptor)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, descriptor: &RuleDescriptor) -> Option<Severity> {
        self.rule_config(descriptor).and_then(|c| c.severity)
    }
}

fn section<T: DeserializeOwned + Default>(
    root: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> T {
    let Some(value) = root.get(key) else {
        return T::default();
    };
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Invalid configuration section '{key}': {e}; using defaults");
            T::default()
        }
    }
}

/// Source discovery configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceLoaderConfig {
    /// Directory names skipped anywhere in the tree (build output).
    pub excluded_directories: Vec<String>,
    /// File-name suffixes of generated files.
    pub excluded_suffixes: Vec<String>,
    /// Additional glob patterns, matched against the project-relative path.
    pub exclude: Vec<String>,
    /// Whether to respect `.gitignore` files.
    pub respect_gitignore: bool,
}

impl Default for SourceLoaderConfig {
    fn default() -> Self {
        Self {
            excluded_directories: ["bin", "obj"].map(String::from).to_vec(),
            excluded_suffixes: [
                ".g.cs",
                ".g.i.cs",
                ".Designer.cs",
                ".designer.cs",
                ".generated.cs",
                "AssemblyInfo.cs",
            ]
            .map(String::from)
            .to_vec(),
            exclude: Vec::new(),
            respect_gitignore: true,
        }
    }
}

/// Orchestrator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzerConfig {
    /// Worker count; defaults to the number of available cores.
    pub parallelism: Option<usize>,
    /// Per-file analysis time limit in milliseconds.
    pub file_timeout_ms: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            parallelism: None,
            file_timeout_ms: 10_000,
        }
    }
}

/// Folder-structure analyzer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FolderStructureConfig {
    /// Whether the analyzer runs.
    pub enabled: bool,
    /// Severity of placement violations.
    pub enforcement_level: Severity,
    /// Folders that must exist under the project root.
    pub required_folders: BTreeSet<String>,
    /// Folder each declaration kind must live in.
    pub file_type_to_folder_mapping: BTreeMap<DeclarationKind, String>,
    /// File-name globs identifying infrastructure files.
    pub infrastructure_patterns: Vec<String>,
    /// Folder infrastructure files must live in.
    pub infrastructure_folder: String,
}

impl Default for FolderStructureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enforcement_level: Severity::Error,
            required_folders: BTreeSet::new(),
            file_type_to_folder_mapping: BTreeMap::from([(
                DeclarationKind::Interface,
                "Interfaces".to_string(),
            )]),
            infrastructure_patterns: vec!["*Bootstrapper.cs".to_string()],
            infrastructure_folder: "Infrastructure".to_string(),
        }
    }
}

/// Method-region settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MethodRegionsConfig {
    /// Whether the check runs.
    pub enabled: bool,
    /// Severity of violations.
    pub enforcement_level: Severity,
    /// Region name format; `{MethodName}` or `{0}` is the method identifier.
    pub method_region_name_format: String,
}

impl Default for MethodRegionsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enforcement_level: Severity::Error,
            method_region_name_format: "{MethodName}".to_string(),
        }
    }
}

/// Class-region settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassRegionsConfig {
    /// Whether the check runs.
    pub enabled: bool,
    /// Severity of violations.
    pub enforcement_level: Severity,
    /// Regions every class body must contain, in order.
    pub required_class_regions: Vec<String>,
}

impl Default for ClassRegionsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enforcement_level: Severity::Error,
            required_class_regions: ["Properties", "Construction", "Methods"]
                .map(String::from)
                .to_vec(),
        }
    }
}

/// Documentation-completeness settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct XmlDocumentationConfig {
    /// Whether the analyzer runs.
    pub enabled: bool,
    /// Severity of missing documentation.
    pub enforcement_level: Severity,
}

impl Default for XmlDocumentationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enforcement_level: Severity::Error,
        }
    }
}

/// Self-qualifier settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThisQualifierConfig {
    /// Whether the analyzer runs.
    pub enforce_this_qualifier: bool,
    /// Severity of violations.
    pub enforcement_level: Severity,
    /// Check instance properties.
    pub properties: bool,
    /// Check instance methods.
    pub methods: bool,
    /// Check instance fields and field-like events.
    pub fields: bool,
    /// Forces Error severity regardless of `enforcement_level`.
    pub mandatory: bool,
}

impl Default for ThisQualifierConfig {
    fn default() -> Self {
        Self {
            enforce_this_qualifier: true,
            enforcement_level: Severity::Error,
            properties: true,
            methods: true,
            fields: true,
            mandatory: false,
        }
    }
}

impl ThisQualifierConfig {
    /// Effective severity after applying the mandatory flag.
    #[must_use]
    pub fn severity(&self) -> Severity {
        if self.mandatory {
            Severity::Error
        } else {
            self.enforcement_level
        }
    }
}

/// File-organization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassFileOrganizationConfig {
    /// Whether the analyzer runs.
    pub enabled: bool,
    /// Severity of violations.
    pub enforcement_level: Severity,
    /// Report files declaring more than one class.
    pub one_class_per_file: bool,
    /// Report files whose name differs from their class.
    pub filename_must_match_class: bool,
    /// Compound extensions of code-behind files (e.g. `.xaml.cs`).
    pub code_behind_extensions: BTreeSet<String>,
}

impl Default for ClassFileOrganizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enforcement_level: Severity::Error,
            one_class_per_file: true,
            filename_must_match_class: true,
            code_behind_extensions: BTreeSet::from([".xaml.cs".to_string()]),
        }
    }
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MULTIPLE_CLASSES, THIS_QUALIFIER};

    #[test]
    fn test_default_config() {
        let config = Configuration::default();
        assert!(config.source_loader.respect_gitignore);
        assert!(config.rules.is_empty());
        assert_eq!(
            config.class_regions.required_class_regions,
            vec!["Properties", "Construction", "Methods"]
        );
        assert!(config
            .class_file_organization
            .code_behind_extensions
            .contains(".xaml.cs"));
    }

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "folderStructure": {
                "enforcementLevel": "warning",
                "requiredFolders": ["Interfaces", "Infrastructure"],
                "fileTypeToFolderMapping": { "interface": "Interfaces", "abstractClass": "Abstractions" }
            },
            "thisQualifier": { "enforceThisQualifier": true, "fields": false, "mandatory": true },
            "rules": { "multiple-classes": { "enabled": false }, "CSG0401": { "severity": "warning" } }
        }"#;

        let config = Configuration::parse(json).expect("Failed to parse");
        assert_eq!(config.folder_structure.enforcement_level, Severity::Warning);
        assert_eq!(config.folder_structure.required_folders.len(), 2);
        assert_eq!(
            config
                .folder_structure
                .file_type_to_folder_mapping
                .get(&DeclarationKind::AbstractClass)
                .map(String::as_str),
            Some("Abstractions")
        );
        assert!(!config.this_qualifier.fields);
        assert_eq!(config.this_qualifier.severity(), Severity::Error);
        assert!(!config.is_rule_enabled(&MULTIPLE_CLASSES));
        assert!(config.is_rule_enabled(&THIS_QUALIFIER));
        assert_eq!(config.rule_severity(&THIS_QUALIFIER), Some(Severity::Warning));
        // untouched sections keep their defaults
        assert_eq!(config.method_regions, MethodRegionsConfig::default());
    }

    #[test]
    fn code_key_wins_over_name_key() {
        let json = r#"{
            "rules": {
                "this-qualifier": { "severity": "warning", "enabled": false },
                "CSG0401": { "severity": "error" }
            }
        }"#;
        let config = Configuration::parse(json).expect("parse");
        assert_eq!(config.rule_severity(&THIS_QUALIFIER), Some(Severity::Error));
        assert!(config.is_rule_enabled(&THIS_QUALIFIER));

        let json = r#"{ "rules": { "csg0401": { "enabled": false }, "this-qualifier": {} } }"#;
        let config = Configuration::parse(json).expect("parse");
        assert!(!config.is_rule_enabled(&THIS_QUALIFIER));
    }

    #[test]
    fn malformed_section_falls_back_to_defaults() {
        let json = r#"{
            "classRegions": { "requiredClassRegions": "Properties" },
            "xmlDocumentation": { "enabled": false }
        }"#;
        let config = Configuration::parse(json).expect("document is valid JSON");
        assert_eq!(config.class_regions, ClassRegionsConfig::default());
        assert!(!config.xml_documentation.enabled);
    }

    #[test]
    fn invalid_document_is_an_error() {
        assert!(Configuration::parse("{ not json").is_err());
        assert!(Configuration::parse("[1, 2]").is_err());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let config = Configuration::load_or_default(Path::new("/definitely/missing/csguard.json"));
        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn defaults_round_trip_through_json() {
        let json = Configuration::default().to_json().expect("serialize");
        assert!(json.contains("\"methodRegionNameFormat\""));
        let parsed = Configuration::parse(&json).expect("parse");
        assert_eq!(parsed, Configuration::default());
    }
}
