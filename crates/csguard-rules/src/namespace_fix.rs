//! Code fix aligning a misplaced declaration's namespace with its target folder.
//!
//! Moving the file is left to the caller; the edit only appends the target
//! folder segments to the enclosing namespace name, so that once the file is
//! moved its namespace already matches.

use std::collections::BTreeMap;

use csguard_core::syntax::{self, TypeDecl};
use csguard_core::{CodeFixEdit, Configuration, DeclarationKind, FixProvider, SourceFile, Violation};

static CODES: [&str; 3] = ["CSG0101", "CSG0102", "CSG0103"];

/// Appends the mapped folder to the enclosing namespace.
#[derive(Debug, Clone)]
pub struct AlignNamespace {
    mapping: BTreeMap<DeclarationKind, String>,
}

impl Default for AlignNamespace {
    fn default() -> Self {
        Self::from_config(&Configuration::default())
    }
}

impl AlignNamespace {
    /// Creates the provider with the default folder mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the provider from the `folderStructure` mapping.
    #[must_use]
    pub fn from_config(config: &Configuration) -> Self {
        Self {
            mapping: config.folder_structure.file_type_to_folder_mapping.clone(),
        }
    }
}

/// `Core/Interfaces` becomes `["Core", "Interfaces"]`.
fn namespace_segments(folder: &str) -> Vec<&str> {
    folder
        .split(['/', '\\'])
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

fn ends_with_segments(namespace: &str, segments: &[&str]) -> bool {
    let parts: Vec<&str> = namespace.split('.').map(str::trim).collect();
    parts.len() >= segments.len()
        && parts[parts.len() - segments.len()..]
            .iter()
            .zip(segments)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
}

impl FixProvider for AlignNamespace {
    fn codes(&self) -> &'static [&'static str] {
        &CODES
    }

    fn description(&self) -> &'static str {
        "Append the target folder to the namespace"
    }

    fn provide(&self, file: &SourceFile, violation: &Violation) -> Option<CodeFixEdit> {
        let tree = file.tree.as_ref()?;
        let start = violation.location.offset;
        let end = start + violation.location.length;
        let name = tree.root_node().descendant_for_byte_range(start, end)?;
        let decl = TypeDecl::from_node(name.parent()?)?;
        if decl.name_node != name {
            return None;
        }
        let folder = self.mapping.get(&decl.declaration_kind(&file.text))?;
        let segments = namespace_segments(folder);
        if segments.is_empty() {
            return None;
        }

        let ns = syntax::enclosing_namespace_name(decl.node)?;
        let current = syntax::node_text(ns, &file.text);
        if ends_with_segments(current, &segments) {
            return None;
        }
        let replacement = format!("{current}.{}", segments.join("."));
        Some(CodeFixEdit {
            file: file.relative_path.clone(),
            start: ns.start_byte(),
            end: ns.end_byte(),
            description: format!("Change namespace '{current}' to '{replacement}'"),
            replacement,
        })
    }
}
