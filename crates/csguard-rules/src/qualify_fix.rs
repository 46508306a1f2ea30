//! Code fix adding `this.` to an unqualified instance member reference.

use csguard_core::{CodeFixEdit, FixProvider, SourceFile, Violation};

use crate::this_qualifier::is_initializer_target;

static CODES: [&str; 1] = ["CSG0401"];

/// Rewrites `Radius` to `this.Radius` at a `this-qualifier` diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualifyWithThis;

impl QualifyWithThis {
    /// Creates the provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FixProvider for QualifyWithThis {
    fn codes(&self) -> &'static [&'static str] {
        &CODES
    }

    fn description(&self) -> &'static str {
        "Qualify the member reference with 'this.'"
    }

    fn provide(&self, file: &SourceFile, violation: &Violation) -> Option<CodeFixEdit> {
        let tree = file.tree.as_ref()?;
        let start = violation.location.offset;
        let end = start + violation.location.length;
        let node = tree.root_node().descendant_for_byte_range(start, end)?;
        if node.kind() != "identifier" || node.start_byte() != start || node.end_byte() != end {
            return None;
        }
        if is_initializer_target(node) {
            return None;
        }
        let name = file.text.get(start..end)?;
        Some(CodeFixEdit {
            file: file.relative_path.clone(),
            start,
            end,
            replacement: format!("this.{name}"),
            description: format!("Qualify '{name}' with 'this.'"),
        })
    }
}
