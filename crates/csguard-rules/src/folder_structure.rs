//! Folder-structure analyzers.
//!
//! [`FolderStructure`] checks each file against the configured
//! kind-to-folder mapping and infrastructure naming patterns.
//! [`RequiredFolders`] checks once per project that the configured folders
//! exist.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use csguard_core::catalog::{
    RuleDescriptor, ABSTRACT_CLASS_PLACEMENT, INFRASTRUCTURE_PLACEMENT, INTERFACE_PLACEMENT,
    REQUIRED_FOLDER_MISSING, TYPE_PLACEMENT,
};
use csguard_core::utils::dir_contains_folder;
use csguard_core::{
    syntax, Configuration, DeclarationKind, FileContext, Location, ProjectContext, ProjectRule,
    Rule, RuleError, Severity, Suggestion, Violation,
};
use glob::{MatchOptions, Pattern};
use tracing::warn;

/// Analyzer name.
pub const NAME: &str = "folder-structure";

/// Project analyzer name.
pub const REQUIRED_FOLDERS_NAME: &str = "required-folders";

static DESCRIPTORS: [&RuleDescriptor; 4] = [
    &INTERFACE_PLACEMENT,
    &ABSTRACT_CLASS_PLACEMENT,
    &TYPE_PLACEMENT,
    &INFRASTRUCTURE_PLACEMENT,
];

static PROJECT_DESCRIPTORS: [&RuleDescriptor; 1] = [&REQUIRED_FOLDER_MISSING];

const NAME_MATCH: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Checks that declarations and infrastructure files live in their folders.
#[derive(Debug, Clone)]
pub struct FolderStructure {
    /// Folder each declaration kind must live in.
    pub mapping: BTreeMap<DeclarationKind, String>,
    /// Compiled file-name patterns of infrastructure files.
    pub infrastructure_patterns: Vec<Pattern>,
    /// Folder infrastructure files must live in.
    pub infrastructure_folder: String,
    /// Severity of violations.
    pub severity: Severity,
}

impl Default for FolderStructure {
    fn default() -> Self {
        Self::from_config(&Configuration::default())
    }
}

impl FolderStructure {
    /// Creates the analyzer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the analyzer from the `folderStructure` section.
    ///
    /// Invalid infrastructure patterns are logged and skipped.
    #[must_use]
    pub fn from_config(config: &Configuration) -> Self {
        let section = &config.folder_structure;
        let infrastructure_patterns = section
            .infrastructure_patterns
            .iter()
            .filter_map(|p| match Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Ignoring infrastructure pattern '{p}': {e}");
                    None
                }
            })
            .collect();
        Self {
            mapping: section.file_type_to_folder_mapping.clone(),
            infrastructure_patterns,
            infrastructure_folder: section.infrastructure_folder.clone(),
            severity: section.enforcement_level,
        }
    }

    /// Maps a declaration kind to a folder.
    #[must_use]
    pub fn map(mut self, kind: DeclarationKind, folder: impl Into<String>) -> Self {
        self.mapping.insert(kind, folder.into());
        self
    }

    fn is_infrastructure(&self, file_name: &str) -> bool {
        self.infrastructure_patterns
            .iter()
            .any(|p| p.matches_with(file_name, NAME_MATCH))
    }
}

impl Rule for FolderStructure {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Requires declarations and infrastructure files to live in their configured folders"
    }

    fn descriptors(&self) -> &'static [&'static RuleDescriptor] {
        &DESCRIPTORS
    }

    fn check(&self, ctx: &FileContext<'_>) -> Result<Vec<Violation>, RuleError> {
        let src = ctx.content;
        let mut violations = Vec::new();

        for decl in syntax::top_level_types(ctx.root()) {
            ctx.check_deadline()?;
            let kind = decl.declaration_kind(src);
            let Some(folder) = self.mapping.get(&kind) else {
                continue;
            };
            if dir_contains_folder(ctx.relative_path, folder) {
                continue;
            }
            let name = decl.name(src);
            let violation = match kind {
                DeclarationKind::Interface => Violation::from_descriptor(
                    &INTERFACE_PLACEMENT,
                    self.severity,
                    ctx.location(decl.name_node),
                    &[name, folder],
                ),
                DeclarationKind::AbstractClass => Violation::from_descriptor(
                    &ABSTRACT_CLASS_PLACEMENT,
                    self.severity,
                    ctx.location(decl.name_node),
                    &[name, folder],
                ),
                _ => Violation::from_descriptor(
                    &TYPE_PLACEMENT,
                    self.severity,
                    ctx.location(decl.name_node),
                    &[kind.label(), name, folder],
                ),
            };
            violations.push(
                violation.with_suggestion(Suggestion::new(format!("Move the file into '{folder}'"))),
            );
        }

        let file_name = ctx.file_name();
        if self.is_infrastructure(file_name)
            && !dir_contains_folder(ctx.relative_path, &self.infrastructure_folder)
        {
            violations.push(
                Violation::from_descriptor(
                    &INFRASTRUCTURE_PLACEMENT,
                    self.severity,
                    Location::new(ctx.relative_path.to_path_buf(), 1, 1),
                    &[file_name, &self.infrastructure_folder],
                )
                .with_suggestion(Suggestion::new(format!(
                    "Move the file into '{}'",
                    self.infrastructure_folder
                ))),
            );
        }

        Ok(violations)
    }
}

/// Checks that every configured required folder exists under the root.
#[derive(Debug, Clone)]
pub struct RequiredFolders {
    /// Folders that must exist, relative to the project root.
    pub folders: BTreeSet<String>,
    /// Severity of violations.
    pub severity: Severity,
}

impl RequiredFolders {
    /// Creates the analyzer from the `folderStructure` section.
    #[must_use]
    pub fn from_config(config: &Configuration) -> Self {
        Self {
            folders: config.folder_structure.required_folders.clone(),
            severity: config.folder_structure.enforcement_level,
        }
    }
}

/// Resolves `folder` under `root`, matching each segment case-insensitively.
fn find_folder(root: &Path, folder: &str) -> Option<PathBuf> {
    let mut current = root.to_path_buf();
    for segment in folder.split(['/', '\\']).filter(|s| !s.is_empty() && *s != ".") {
        let exact = current.join(segment);
        if exact.is_dir() {
            current = exact;
            continue;
        }
        current = fs::read_dir(&current)
            .ok()?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .find(|p| {
                p.is_dir()
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.eq_ignore_ascii_case(segment))
            })?;
    }
    Some(current)
}

impl ProjectRule for RequiredFolders {
    fn name(&self) -> &'static str {
        REQUIRED_FOLDERS_NAME
    }

    fn descriptors(&self) -> &'static [&'static RuleDescriptor] {
        &PROJECT_DESCRIPTORS
    }

    fn check_project(&self, ctx: &ProjectContext<'_>) -> Vec<Violation> {
        self.folders
            .iter()
            .filter(|folder| find_folder(ctx.root, folder).is_none())
            .map(|folder| {
                Violation::from_descriptor(
                    &REQUIRED_FOLDER_MISSING,
                    self.severity,
                    Location::new(PathBuf::from(folder), 1, 1),
                    &[folder],
                )
                .with_suggestion(Suggestion::new(format!("Create the folder '{folder}'")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::run_rule;
    use tempfile::TempDir;

    #[test]
    fn interface_in_mapped_folder_is_clean() {
        let src = "namespace App.Interfaces\n{\n    public interface IShape { }\n}\n";
        assert!(run_rule(&FolderStructure::new(), "Core/Interfaces/IShape.cs", src).is_empty());
        assert!(run_rule(&FolderStructure::new(), "core/interfaces/IShape.cs", src).is_empty());
    }

    #[test]
    fn misplaced_interface_reported_at_declaration() {
        let src = "namespace App\n{\n    public interface IShape { }\n    public interface IArea { }\n}\n";
        let violations = run_rule(&FolderStructure::new(), "Models/IShape.cs", src);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].code, "CSG0101");
        assert_eq!((violations[0].location.line, violations[0].location.column), (3, 22));
        insta::assert_snapshot!(&violations[0].message, @"Interface 'IShape' declaration should be placed in 'Interfaces' folder");
    }

    #[test]
    fn partial_folder_name_does_not_count() {
        let src = "public interface IShape { }\n";
        let violations = run_rule(&FolderStructure::new(), "MyInterfaces/IShape.cs", src);
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn abstract_and_other_kinds_use_their_codes() {
        let rule = FolderStructure::new()
            .map(DeclarationKind::AbstractClass, "Abstractions")
            .map(DeclarationKind::Enum, "Core/Enums");
        let src = "public abstract class Shape { }\npublic enum Color { Red }\npublic class Ball { }\n";
        let violations = run_rule(&rule, "Models/Shape.cs", src);
        let codes: Vec<_> = violations.iter().map(|v| v.code.as_str()).collect();
        assert_eq!(codes, ["CSG0102", "CSG0103"]);
        assert_eq!(
            violations[1].message,
            "Enum 'Color' declaration should be placed in 'Core/Enums' folder"
        );
        assert!(run_rule(&rule, "Core/Enums/Abstractions/Shape.cs", src).is_empty());
    }

    #[test]
    fn nested_interfaces_are_ignored() {
        let src = "public class Outer\n{\n    public interface IInner { }\n}\n";
        assert!(run_rule(&FolderStructure::new(), "Models/Outer.cs", src).is_empty());
    }

    #[test]
    fn infrastructure_file_outside_folder() {
        let src = "public class AppBootstrapper { }\n";
        let violations = run_rule(&FolderStructure::new(), "Startup/AppBootstrapper.cs", src);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, "CSG0104");
        assert_eq!(violations[0].location.line, 1);
        insta::assert_snapshot!(&violations[0].message, @"Infrastructure file 'AppBootstrapper.cs' should be placed in 'Infrastructure' folder");

        assert!(run_rule(&FolderStructure::new(), "Infrastructure/AppBootstrapper.cs", src).is_empty());
        assert_eq!(run_rule(&FolderStructure::new(), "Startup/appbootstrapper.cs", src).len(), 1);
    }

    #[test]
    fn required_folders_reported_when_missing() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("src").join("interfaces")).expect("mkdir");
        let mut config = Configuration::default();
        config.folder_structure.required_folders =
            ["src/Interfaces".to_string(), "Infrastructure".to_string()].into();
        let rule = RequiredFolders::from_config(&config);
        let violations = rule.check_project(&ProjectContext::new(dir.path()));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, "CSG0105");
        assert_eq!(
            violations[0].message,
            "Required folder 'Infrastructure' does not exist in the project"
        );
    }
}
