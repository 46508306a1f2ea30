//! Traits for analyzers and code-fix providers.

use crate::catalog::RuleDescriptor;
use crate::context::{FileContext, ProjectContext};
use crate::fix::CodeFixEdit;
use crate::source::SourceFile;
use crate::types::Violation;

/// Failure of one analyzer on one file.
///
/// The orchestrator turns these into infrastructure diagnostics; they never
/// abort a run.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// The per-file deadline expired.
    #[error("analysis took {elapsed_ms} ms, limit is {limit_ms} ms")]
    Timeout {
        /// Time spent so far.
        elapsed_ms: u64,
        /// Configured limit.
        limit_ms: u64,
    },

    /// The analyzer could not evaluate the file.
    #[error("{0}")]
    Evaluation(String),
}

/// A per-file analyzer over the C# syntax tree.
///
/// # Example
///
/// ```ignore
/// use csguard_core::{FileContext, Rule, RuleError, Violation};
///
/// static DESCRIPTORS: [&RuleDescriptor; 1] = [&NO_GOTO];
///
/// pub struct NoGotos;
///
/// impl Rule for NoGotos {
///     fn name(&self) -> &'static str { "no-gotos" }
///     fn descriptors(&self) -> &'static [&'static RuleDescriptor] { &DESCRIPTORS }
///
///     fn check(&self, ctx: &FileContext) -> Result<Vec<Violation>, RuleError> {
///         // walk ctx.root(), calling ctx.check_deadline()? periodically
///         Ok(Vec::new())
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Kebab-case analyzer name (e.g., "folder-structure").
    fn name(&self) -> &'static str;

    /// Brief description of what this analyzer checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Catalog entries this analyzer can emit.
    fn descriptors(&self) -> &'static [&'static RuleDescriptor];

    /// Checks a single parsed file.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Timeout`] when the file's deadline expires, or
    /// [`RuleError::Evaluation`] when the file cannot be evaluated.
    fn check(&self, ctx: &FileContext<'_>) -> Result<Vec<Violation>, RuleError>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

/// A project-wide rule based on directory structure.
pub trait ProjectRule: Send + Sync {
    /// Kebab-case rule name.
    fn name(&self) -> &'static str;

    /// Catalog entries this rule can emit.
    fn descriptors(&self) -> &'static [&'static RuleDescriptor];

    /// Checks the project and returns any violations found.
    fn check_project(&self, ctx: &ProjectContext<'_>) -> Vec<Violation>;
}

/// Type alias for boxed `ProjectRule` trait objects.
pub type ProjectRuleBox = Box<dyn ProjectRule>;

/// Produces an edit resolving one diagnostic.
///
/// Providers are pure: they inspect the file and the diagnostic and return
/// an edit, or `None` when they have nothing to offer. They never write.
pub trait FixProvider: Send + Sync {
    /// Rule codes this provider can fix.
    fn codes(&self) -> &'static [&'static str];

    /// Short description of the fix.
    fn description(&self) -> &'static str;

    /// Computes an edit for `violation` in `file`.
    fn provide(&self, file: &SourceFile, violation: &Violation) -> Option<CodeFixEdit>;

    /// Whether this provider handles the violation's code.
    fn handles(&self, violation: &Violation) -> bool {
        self.codes().contains(&violation.code.as_str())
    }
}

/// Type alias for boxed `FixProvider` trait objects.
pub type FixProviderBox = Box<dyn FixProvider>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MULTIPLE_CLASSES;
    use crate::types::{Location, Severity};
    use std::path::PathBuf;

    static DESCRIPTORS: [&RuleDescriptor; 1] = [&MULTIPLE_CLASSES];

    struct TestRule;

    impl Rule for TestRule {
        fn name(&self) -> &'static str {
            "test-rule"
        }

        fn descriptors(&self) -> &'static [&'static RuleDescriptor] {
            &DESCRIPTORS
        }

        fn check(&self, ctx: &FileContext<'_>) -> Result<Vec<Violation>, RuleError> {
            ctx.check_deadline()?;
            Ok(vec![Violation::from_descriptor(
                &MULTIPLE_CLASSES,
                Severity::Error,
                ctx.location(ctx.root()),
                &["2", "A, B"],
            )])
        }
    }

    #[test]
    fn test_rule_trait() {
        let file = SourceFile::parse(
            PathBuf::from("/p/A.cs"),
            PathBuf::from("A.cs"),
            "class A {} class B {}".to_string(),
        );
        let ctx = FileContext::from_source(&file).expect("parsed");
        let rule = TestRule;
        assert_eq!(rule.name(), "test-rule");
        assert_eq!(rule.description(), "");
        let violations = rule.check(&ctx).expect("check");
        assert_eq!(violations[0].code, "CSG0501");
        assert_eq!(violations[0].location, Location::from_node(PathBuf::from("A.cs"), ctx.root()));
    }

    #[test]
    fn timeout_error_message() {
        let err = RuleError::Timeout {
            elapsed_ms: 12,
            limit_ms: 10,
        };
        assert_eq!(err.to_string(), "analysis took 12 ms, limit is 10 ms");
    }
}
