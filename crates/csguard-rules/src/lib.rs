//! # csguard-rules
//!
//! Built-in structural rules and code fixes for csguard.
//!
//! ## Available Rules
//!
//! | Code | Name | Analyzer | Description |
//! |------|------|----------|-------------|
//! | CSG0101 | `interface-placement` | [`FolderStructure`] | Interfaces live in their mapped folder |
//! | CSG0102 | `abstract-class-placement` | [`FolderStructure`] | Abstract classes live in their mapped folder |
//! | CSG0103 | `type-placement` | [`FolderStructure`] | Other mapped kinds live in their folder |
//! | CSG0104 | `infrastructure-placement` | [`FolderStructure`] | Infrastructure-named files live in the infrastructure folder |
//! | CSG0105 | `required-folder-missing` | [`RequiredFolders`] | Configured folders exist |
//! | CSG0201 | `method-region` | [`RegionStructure`] | Each method sits in its own named region |
//! | CSG0202 | `class-regions` | [`RegionStructure`] | Class bodies follow the required region layout |
//! | CSG0301 | `missing-documentation` | [`Documentation`] | Public API carries complete XML docs |
//! | CSG0302 | `documentation-mismatch` | [`Documentation`] | XML docs agree with the declaration |
//! | CSG0401 | `this-qualifier` | [`ThisQualifier`] | Instance members are accessed through `this.` |
//! | CSG0501 | `multiple-classes` | [`FileOrganization`] | One class per file |
//! | CSG0502 | `filename-class-mismatch` | [`FileOrganization`] | File name matches the class |
//!
//! ## Code Fixes
//!
//! - [`QualifyWithThis`] for CSG0401
//! - [`AlignNamespace`] for CSG0101 to CSG0103
//!
//! ## Usage
//!
//! ```ignore
//! use csguard_core::{Analyzer, Configuration};
//! use csguard_rules::{all_fix_providers, project_rules_from_config, rules_from_config};
//!
//! let config = Configuration::load_or_default("csguard.json".as_ref());
//! let mut builder = Analyzer::builder().root("./src").config(config.clone());
//! for rule in rules_from_config(&config, false) {
//!     builder = builder.rule_box(rule);
//! }
//! let result = builder.build()?.analyze()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod documentation;
mod file_organization;
mod folder_structure;
mod namespace_fix;
mod presets;
mod qualify_fix;
mod region_structure;
pub mod regions;
mod this_qualifier;

pub use documentation::Documentation;
pub use file_organization::FileOrganization;
pub use folder_structure::{FolderStructure, RequiredFolders};
pub use namespace_fix::AlignNamespace;
pub use presets::{all_fix_providers, project_rules_from_config, rules_from_config, Preset};
pub use qualify_fix::QualifyWithThis;
pub use region_structure::RegionStructure;
pub use this_qualifier::{MemberCategory, ThisQualifier};

/// Re-export core types for convenience.
pub use csguard_core::{Rule, Severity, Violation};
