//! File-organization analyzer: one class per file, named after the class.

use std::collections::BTreeSet;
use std::path::Path;

use csguard_core::catalog::{RuleDescriptor, FILENAME_CLASS_MISMATCH, MULTIPLE_CLASSES};
use csguard_core::syntax::{self, TypeDecl, TypeKind};
use csguard_core::utils::strip_suffix_ignore_case;
use csguard_core::{Configuration, FileContext, Rule, RuleError, Severity, Suggestion, Violation};

/// Analyzer name.
pub const NAME: &str = "file-organization";

static DESCRIPTORS: [&RuleDescriptor; 2] = [&MULTIPLE_CLASSES, &FILENAME_CLASS_MISMATCH];

/// Checks class count and file naming.
#[derive(Debug, Clone)]
pub struct FileOrganization {
    /// Report files declaring more than one class.
    pub one_class_per_file: bool,
    /// Report file names that differ from the primary type.
    pub filename_must_match_class: bool,
    /// Compound extensions of code-behind files.
    pub code_behind_extensions: BTreeSet<String>,
    /// Severity of violations.
    pub severity: Severity,
}

impl Default for FileOrganization {
    fn default() -> Self {
        Self::from_config(&Configuration::default())
    }
}

impl FileOrganization {
    /// Creates the analyzer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the analyzer from the `classFileOrganization` section.
    #[must_use]
    pub fn from_config(config: &Configuration) -> Self {
        let section = &config.class_file_organization;
        Self {
            one_class_per_file: section.one_class_per_file,
            filename_must_match_class: section.filename_must_match_class,
            code_behind_extensions: section.code_behind_extensions.clone(),
            severity: section.enforcement_level,
        }
    }

    /// File name with its extension stripped.
    ///
    /// A code-behind file (`Main.xaml.cs`) loses its whole compound
    /// extension when the markup file (`Main.xaml`) sits next to it.
    /// Otherwise only the last extension is removed.
    fn file_stem(&self, path: &Path) -> String {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return String::new();
        };
        for ext in &self.code_behind_extensions {
            let Some(base) = strip_suffix_ignore_case(name, ext) else {
                continue;
            };
            let markup_ext = ext.rsplit_once('.').map_or(ext.as_str(), |(head, _)| head);
            let markup = path.with_file_name(format!("{base}{markup_ext}"));
            if markup.is_file() {
                return base.to_string();
            }
        }
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Distinct top-level classes in declaration order; partial fragments once.
fn distinct_classes<'t>(types: &[TypeDecl<'t>], src: &str) -> Vec<TypeDecl<'t>> {
    let mut seen = BTreeSet::new();
    types
        .iter()
        .filter(|t| t.kind == TypeKind::Class)
        .filter(|t| seen.insert(t.name(src).to_string()))
        .copied()
        .collect()
}

impl Rule for FileOrganization {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Requires one class per file and a file name matching the class"
    }

    fn descriptors(&self) -> &'static [&'static RuleDescriptor] {
        &DESCRIPTORS
    }

    fn check(&self, ctx: &FileContext<'_>) -> Result<Vec<Violation>, RuleError> {
        ctx.check_deadline()?;
        let src = ctx.content;
        let types = syntax::top_level_types(ctx.root());
        let classes = distinct_classes(&types, src);
        let mut violations = Vec::new();

        if self.one_class_per_file && classes.len() > 1 {
            let names: Vec<&str> = classes.iter().map(|c| c.name(src)).collect();
            violations.push(
                Violation::from_descriptor(
                    &MULTIPLE_CLASSES,
                    self.severity,
                    ctx.location(classes[1].name_node),
                    &[&classes.len().to_string(), &names.join(", ")],
                )
                .with_suggestion(Suggestion::new("Move each class into its own file")),
            );
        }

        if self.filename_must_match_class {
            let primary = match (classes.as_slice(), types.as_slice()) {
                ([only], _) | ([], [only]) => Some(*only),
                _ => None,
            };
            if let Some(primary) = primary {
                let stem = self.file_stem(ctx.path);
                let name = primary.name(src);
                if stem != name {
                    violations.push(
                        Violation::from_descriptor(
                            &FILENAME_CLASS_MISMATCH,
                            self.severity,
                            ctx.location(primary.name_node),
                            &[&stem, name],
                        )
                        .with_suggestion(Suggestion::new(format!("Rename the file to '{name}.cs'"))),
                    );
                }
            }
        }

        Ok(violations)
    }
}
