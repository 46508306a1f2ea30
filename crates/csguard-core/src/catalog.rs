//! Static catalog of every rule csguard can report.
//!
//! Each [`RuleDescriptor`] is process-wide and immutable. Analyzers refer to
//! descriptors by reference and fill their message templates; the report
//! groups violations by descriptor code.

use serde::Serialize;

use crate::types::Severity;

/// Functional area a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Physical placement of files and folders.
    FolderStructure,
    /// `#region` grouping inside files.
    RegionStructure,
    /// XML documentation completeness.
    Documentation,
    /// Explicit `this.` qualification of instance members.
    ThisQualifier,
    /// One class per file and file naming.
    FileOrganization,
    /// Problems of the analysis itself (parse failures, crashed analyzers).
    Infrastructure,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::FolderStructure => "folder-structure",
            Self::RegionStructure => "region-structure",
            Self::Documentation => "documentation",
            Self::ThisQualifier => "this-qualifier",
            Self::FileOrganization => "file-organization",
            Self::Infrastructure => "infrastructure",
        };
        f.write_str(s)
    }
}

/// Static metadata identifying one enforceable rule.
#[derive(Debug, Serialize)]
pub struct RuleDescriptor {
    /// Stable rule code (e.g., "CSG0101").
    pub code: &'static str,
    /// Kebab-case rule name (e.g., "interface-placement").
    pub name: &'static str,
    /// Short title.
    pub title: &'static str,
    /// Message template with positional `{0}`, `{1}`, ... placeholders.
    pub message_template: &'static str,
    /// Functional category.
    pub category: Category,
    /// Severity used when neither configuration nor invocation overrides it.
    pub default_severity: Severity,
}

impl RuleDescriptor {
    /// Substitutes positional arguments into the message template.
    ///
    /// Placeholders without a matching argument are left untouched.
    #[must_use]
    pub fn format_message(&self, args: &[&str]) -> String {
        let mut message = self.message_template.to_string();
        for (i, arg) in args.iter().enumerate() {
            message = message.replace(&format!("{{{i}}}"), arg);
        }
        message
    }

    /// Returns true if `key` is this rule's code or name (case-insensitive).
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.code.eq_ignore_ascii_case(key) || self.name.eq_ignore_ascii_case(key)
    }
}

/// Interface declared outside its mapped folder.
pub static INTERFACE_PLACEMENT: RuleDescriptor = RuleDescriptor {
    code: "CSG0101",
    name: "interface-placement",
    title: "Interface placement",
    message_template: "Interface '{0}' declaration should be placed in '{1}' folder",
    category: Category::FolderStructure,
    default_severity: Severity::Error,
};

/// Abstract class declared outside its mapped folder.
pub static ABSTRACT_CLASS_PLACEMENT: RuleDescriptor = RuleDescriptor {
    code: "CSG0102",
    name: "abstract-class-placement",
    title: "Abstract class placement",
    message_template: "Abstract class '{0}' declaration should be placed in '{1}' folder",
    category: Category::FolderStructure,
    default_severity: Severity::Error,
};

/// Any other mapped type kind declared outside its folder.
pub static TYPE_PLACEMENT: RuleDescriptor = RuleDescriptor {
    code: "CSG0103",
    name: "type-placement",
    title: "Type placement",
    message_template: "{0} '{1}' declaration should be placed in '{2}' folder",
    category: Category::FolderStructure,
    default_severity: Severity::Error,
};

/// Infrastructure-named file outside the infrastructure folder.
pub static INFRASTRUCTURE_PLACEMENT: RuleDescriptor = RuleDescriptor {
    code: "CSG0104",
    name: "infrastructure-placement",
    title: "Infrastructure file placement",
    message_template: "Infrastructure file '{0}' should be placed in '{1}' folder",
    category: Category::FolderStructure,
    default_severity: Severity::Error,
};

/// Configured required folder absent from the project.
pub static REQUIRED_FOLDER_MISSING: RuleDescriptor = RuleDescriptor {
    code: "CSG0105",
    name: "required-folder-missing",
    title: "Required folder missing",
    message_template: "Required folder '{0}' does not exist in the project",
    category: Category::FolderStructure,
    default_severity: Severity::Error,
};

/// Method not wrapped in its own named region.
pub static METHOD_REGION: RuleDescriptor = RuleDescriptor {
    code: "CSG0201",
    name: "method-region",
    title: "Method region",
    message_template: "Method '{0}' must be enclosed in region '{1}': {2}",
    category: Category::RegionStructure,
    default_severity: Severity::Error,
};

/// Class body missing required regions or holding misplaced members.
pub static CLASS_REGIONS: RuleDescriptor = RuleDescriptor {
    code: "CSG0202",
    name: "class-regions",
    title: "Class regions",
    message_template: "Class '{0}' does not follow the required region structure: {1}",
    category: Category::RegionStructure,
    default_severity: Severity::Error,
};

/// Public member lacking required XML documentation sections.
pub static MISSING_DOCUMENTATION: RuleDescriptor = RuleDescriptor {
    code: "CSG0301",
    name: "missing-documentation",
    title: "Missing documentation",
    message_template: "{0} '{1}' is missing XML documentation: {2}",
    category: Category::Documentation,
    default_severity: Severity::Error,
};

/// Documentation present but inconsistent with the declaration.
pub static DOCUMENTATION_MISMATCH: RuleDescriptor = RuleDescriptor {
    code: "CSG0302",
    name: "documentation-mismatch",
    title: "Documentation mismatch",
    message_template: "{0} '{1}' has mismatched XML documentation: {2}",
    category: Category::Documentation,
    default_severity: Severity::Warning,
};

/// Instance member accessed without `this.`.
pub static THIS_QUALIFIER: RuleDescriptor = RuleDescriptor {
    code: "CSG0401",
    name: "this-qualifier",
    title: "Explicit this qualifier",
    message_template: "Instance {0} '{1}' must be accessed through 'this.'",
    category: Category::ThisQualifier,
    default_severity: Severity::Error,
};

/// More than one top-level class in a file.
pub static MULTIPLE_CLASSES: RuleDescriptor = RuleDescriptor {
    code: "CSG0501",
    name: "multiple-classes",
    title: "Multiple classes in file",
    message_template: "File declares {0} classes ({1}); each class belongs in its own file",
    category: Category::FileOrganization,
    default_severity: Severity::Error,
};

/// File name differs from the primary type name.
pub static FILENAME_CLASS_MISMATCH: RuleDescriptor = RuleDescriptor {
    code: "CSG0502",
    name: "filename-class-mismatch",
    title: "File name does not match class",
    message_template: "File name '{0}' does not match class name '{1}'",
    category: Category::FileOrganization,
    default_severity: Severity::Error,
};

/// File could not be read or parsed.
pub static PARSE_FAILURE: RuleDescriptor = RuleDescriptor {
    code: "CSG9001",
    name: "parse-failure",
    title: "Parse failure",
    message_template: "File could not be parsed: {0}",
    category: Category::Infrastructure,
    default_severity: Severity::Warning,
};

/// Analyzer failed on a single file.
pub static RULE_EVALUATION_FAILURE: RuleDescriptor = RuleDescriptor {
    code: "CSG9002",
    name: "rule-evaluation-failure",
    title: "Rule evaluation failure",
    message_template: "Analyzer '{0}' failed on this file: {1}",
    category: Category::Infrastructure,
    default_severity: Severity::Warning,
};

/// Analyzer exceeded the per-file time limit.
pub static ANALYSIS_TIMEOUT: RuleDescriptor = RuleDescriptor {
    code: "CSG9003",
    name: "analysis-timeout",
    title: "Analysis timeout",
    message_template: "Analysis exceeded the {0} ms per-file limit in analyzer '{1}'",
    category: Category::Infrastructure,
    default_severity: Severity::Warning,
};

/// Every rule descriptor, ordered by code.
pub static CATALOG: [&RuleDescriptor; 15] = [
    &INTERFACE_PLACEMENT,
    &ABSTRACT_CLASS_PLACEMENT,
    &TYPE_PLACEMENT,
    &INFRASTRUCTURE_PLACEMENT,
    &REQUIRED_FOLDER_MISSING,
    &METHOD_REGION,
    &CLASS_REGIONS,
    &MISSING_DOCUMENTATION,
    &DOCUMENTATION_MISMATCH,
    &THIS_QUALIFIER,
    &MULTIPLE_CLASSES,
    &FILENAME_CLASS_MISMATCH,
    &PARSE_FAILURE,
    &RULE_EVALUATION_FAILURE,
    &ANALYSIS_TIMEOUT,
];

/// Finds a descriptor by code or name.
#[must_use]
pub fn lookup(key: &str) -> Option<&'static RuleDescriptor> {
    CATALOG.iter().copied().find(|d| d.matches(key))
}
