//! Core types for diagnostics and analysis results.

use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tree_sitter::Node;

use crate::catalog::RuleDescriptor;

/// Severity level for diagnostics.
///
/// `Error` diagnostics are build-breaking, `Warning` diagnostics are advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory finding that never fails a build.
    Warning,
    /// Violation that fails the build when fail-on-critical is set.
    Error,
}

impl Severity {
    /// Returns the capitalized label used in the XML report.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Source code location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path relative to project root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Byte offset in file.
    pub offset: usize,
    /// Length of the span in bytes.
    pub length: usize,
}

impl Location {
    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            offset: 0,
            length: 0,
        }
    }

    /// Creates a location covering a syntax node.
    #[must_use]
    pub fn from_node(file: PathBuf, node: Node<'_>) -> Self {
        let start = node.start_position();
        Self {
            file,
            line: start.row + 1,
            column: start.column + 1,
            offset: node.start_byte(),
            length: node.end_byte() - node.start_byte(),
        }
    }

    /// Sets the byte offset and length for this location.
    #[must_use]
    pub fn with_span(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }
}

/// A hint describing how a violation can be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Human-readable description of the fix.
    pub message: String,
}

impl Suggestion {
    /// Creates a new suggestion.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A single reported rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule code (e.g., "CSG0401").
    pub code: String,
    /// Rule name (e.g., "this-qualifier").
    pub rule: String,
    /// Resolved severity of this violation.
    pub severity: Severity,
    /// Primary location of the violation.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// Optional suggestion for fixing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
    /// Whether a registered code fix can address this violation.
    #[serde(default)]
    pub fixable: bool,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            location,
            message: message.into(),
            suggestion: None,
            fixable: false,
        }
    }

    /// Creates a violation from a catalog entry, filling its message template.
    #[must_use]
    pub fn from_descriptor(
        descriptor: &RuleDescriptor,
        severity: Severity,
        location: Location,
        args: &[&str],
    ) -> Self {
        Self::new(
            descriptor.code,
            descriptor.name,
            severity,
            location,
            descriptor.format_message(args),
        )
    }

    /// Adds a suggestion to this violation.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!(
            "{} {} at {}:{}:{}\n",
            self.code,
            self.rule,
            self.location.file.display(),
            self.location.line,
            self.location.column,
        );
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        if let Some(suggestion) = &self.suggestion {
            let _ = writeln!(output, "  = help: {}", suggestion.message);
        }
        if self.fixable {
            let _ = writeln!(output, "  = fix available: run `csguard fix`");
        }
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.severity,
            self.code,
            self.message
        )
    }
}

/// Converts a Violation to a miette Diagnostic for rich error display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        Self {
            message: format!("[{}] {}", v.code, v.message),
            help: v.suggestion.as_ref().map(|s| s.message.clone()),
            span: SourceSpan::from((v.location.offset, v.location.length)),
            label_message: v.rule.clone(),
        }
    }
}

/// Result of running a validation pass.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LintResult {
    /// All violations found, including infrastructure diagnostics.
    pub violations: Vec<Violation>,
    /// Number of files that were parsed and evaluated.
    pub files_checked: usize,
    /// Number of files excluded because they could not be parsed.
    pub files_failed: usize,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    /// Returns violations filtered by severity.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .collect()
    }

    /// Counts violations by severity as `(errors, warnings)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize) {
        let errors = self
            .violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count();
        (errors, self.violations.len() - errors)
    }

    /// Sorts violations by rule code, then file, then position.
    ///
    /// The order is independent of the order in which files finished analysis.
    pub fn sort(&mut self) {
        self.violations.sort_by(|a, b| {
            a.code
                .cmp(&b.code)
                .then_with(|| a.location.file.cmp(&b.location.file))
                .then(a.location.line.cmp(&b.location.line))
                .then(a.location.column.cmp(&b.location.column))
                .then_with(|| a.message.cmp(&b.message))
        });
    }

    /// Adds violations from another result.
    pub fn extend(&mut self, other: Self) {
        self.violations.extend(other.violations);
        self.files_checked += other.files_checked;
        self.files_failed += other.files_failed;
    }
}
