//! Rule sets assembled from configuration.

use csguard_core::{Configuration, FixProviderBox, ProjectRuleBox, RuleBox};

use crate::{
    AlignNamespace, Documentation, FileOrganization, FolderStructure, QualifyWithThis,
    RegionStructure, RequiredFolders, ThisQualifier,
};

/// Preset rule selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Analyzers enabled by the configuration.
    Configured,
    /// Configured analyzers plus self-qualifier and file organization.
    Enhanced,
}

impl Preset {
    /// Picks the preset for an invocation.
    #[must_use]
    pub fn for_invocation(enforce_enhanced_standards: bool) -> Self {
        if enforce_enhanced_standards {
            Self::Enhanced
        } else {
            Self::Configured
        }
    }

    /// Returns the per-file rules for this preset.
    #[must_use]
    pub fn rules(self, config: &Configuration) -> Vec<RuleBox> {
        rules_from_config(config, self == Self::Enhanced)
    }
}

/// Returns the per-file rules enabled by `config`.
///
/// With `enhanced`, the self-qualifier and file-organization analyzers run
/// even when their sections are disabled.
#[must_use]
pub fn rules_from_config(config: &Configuration, enhanced: bool) -> Vec<RuleBox> {
    let mut rules: Vec<RuleBox> = Vec::new();
    if config.folder_structure.enabled {
        rules.push(Box::new(FolderStructure::from_config(config)));
    }
    if config.method_regions.enabled || config.class_regions.enabled {
        rules.push(Box::new(RegionStructure::from_config(config)));
    }
    if config.xml_documentation.enabled {
        rules.push(Box::new(Documentation::from_config(config)));
    }
    if config.this_qualifier.enforce_this_qualifier || enhanced {
        rules.push(Box::new(ThisQualifier::from_config(config)));
    }
    if config.class_file_organization.enabled || enhanced {
        rules.push(Box::new(FileOrganization::from_config(config)));
    }
    rules
}

/// Returns the project-wide rules enabled by `config`.
#[must_use]
pub fn project_rules_from_config(config: &Configuration) -> Vec<ProjectRuleBox> {
    let mut rules: Vec<ProjectRuleBox> = Vec::new();
    if config.folder_structure.enabled && !config.folder_structure.required_folders.is_empty() {
        rules.push(Box::new(RequiredFolders::from_config(config)));
    }
    rules
}

/// Returns every code-fix provider.
#[must_use]
pub fn all_fix_providers(config: &Configuration) -> Vec<FixProviderBox> {
    vec![
        Box::new(QualifyWithThis::new()),
        Box::new(AlignNamespace::from_config(config)),
    ]
}
