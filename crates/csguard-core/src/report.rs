//! Validation report model and XML serialization.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Serialize;

use crate::types::{LintResult, Severity, Violation};

/// Errors writing a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The report file could not be written.
    #[error("Failed to write report {path}: {source}")]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// XML serialization failed.
    #[error("Failed to serialize report: {0}")]
    Xml(String),
}

/// Overall outcome of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuildStatus {
    /// No critical violations, or fail-on-critical disabled.
    Success,
    /// Critical violations present and fail-on-critical enabled.
    Failed,
}

impl BuildStatus {
    /// Label written to the report.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Failed => "Failed",
        }
    }
}

/// Violations of one rule code.
#[derive(Debug, Clone, Serialize)]
pub struct RuleGroup {
    /// Rule code.
    pub code: String,
    /// Rule name.
    pub name: String,
    /// Violations in report order.
    pub violations: Vec<Violation>,
}

/// Totals for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// All violations, infrastructure diagnostics included.
    pub total: usize,
    /// `Error` severity count.
    pub critical: usize,
    /// `Warning` severity count.
    pub warnings: usize,
    /// Pass/fail decision.
    pub build_status: BuildStatus,
}

/// The report produced by one validation run.
#[derive(Debug, Clone, Serialize)]
pub struct ViolationReport {
    /// Name of the validated project.
    pub project_name: String,
    /// When the report was produced.
    pub timestamp: DateTime<Utc>,
    /// Violations grouped by rule code, ordered by code.
    pub groups: Vec<RuleGroup>,
    /// Totals and pass/fail decision.
    pub summary: Summary,
}

impl ViolationReport {
    /// Builds a report from a sorted result.
    ///
    /// `total` always equals the sum of the group sizes; the build fails iff
    /// there is at least one `Error` and `fail_on_critical` is set.
    #[must_use]
    pub fn from_result(project_name: impl Into<String>, result: &LintResult, fail_on_critical: bool) -> Self {
        let mut grouped: BTreeMap<&str, RuleGroup> = BTreeMap::new();
        for v in &result.violations {
            grouped
                .entry(v.code.as_str())
                .or_insert_with(|| RuleGroup {
                    code: v.code.clone(),
                    name: v.rule.clone(),
                    violations: Vec::new(),
                })
                .violations
                .push(v.clone());
        }
        let groups: Vec<RuleGroup> = grouped.into_values().collect();

        let total = groups.iter().map(|g| g.violations.len()).sum();
        let critical = groups
            .iter()
            .flat_map(|g| &g.violations)
            .filter(|v| v.severity == Severity::Error)
            .count();
        let build_status = if fail_on_critical && critical > 0 {
            BuildStatus::Failed
        } else {
            BuildStatus::Success
        };

        Self {
            project_name: project_name.into(),
            timestamp: Utc::now(),
            groups,
            summary: Summary {
                total,
                critical,
                warnings: total - critical,
                build_status,
            },
        }
    }

    /// Replaces the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Process exit code for this outcome: 0 on success, 1 on failure.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self.summary.build_status {
            BuildStatus::Success => 0,
            BuildStatus::Failed => 1,
        }
    }

    /// Serializes the report as an indented XML document.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Xml`] if an event cannot be written.
    pub fn to_xml(&self) -> Result<String, ReportError> {
        let mut w = XmlOut(Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2));
        w.event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        w.start(BytesStart::new("ValidationReport"))?;
        w.text_element("ProjectName", &self.project_name)?;
        w.text_element(
            "Timestamp",
            &self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        )?;

        w.start(BytesStart::new("Violations"))?;
        for group in &self.groups {
            let count = group.violations.len().to_string();
            w.start(BytesStart::new("Rule").with_attributes([
                ("Id", group.code.as_str()),
                ("Name", group.name.as_str()),
                ("Count", count.as_str()),
            ]))?;
            for v in &group.violations {
                let file = v.location.file.to_string_lossy().replace('\\', "/");
                let line = v.location.line.to_string();
                let column = v.location.column.to_string();
                w.start(BytesStart::new("Violation").with_attributes([
                    ("Severity", v.severity.label()),
                    ("File", file.as_str()),
                    ("Line", line.as_str()),
                    ("Column", column.as_str()),
                    ("Fixable", if v.fixable { "true" } else { "false" }),
                ]))?;
                w.text_element("Message", &v.message)?;
                w.end("Violation")?;
            }
            w.end("Rule")?;
        }
        w.end("Violations")?;

        w.start(BytesStart::new("Summary"))?;
        w.text_element("TotalViolations", &self.summary.total.to_string())?;
        w.text_element("CriticalViolations", &self.summary.critical.to_string())?;
        w.text_element("Warnings", &self.summary.warnings.to_string())?;
        w.text_element("BuildStatus", self.summary.build_status.label())?;
        w.end("Summary")?;
        w.end("ValidationReport")?;

        String::from_utf8(w.0.into_inner().into_inner()).map_err(|e| ReportError::Xml(e.to_string()))
    }

    /// Writes the XML report, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Io`] if the file cannot be written.
    pub fn write_xml(&self, path: &Path) -> Result<(), ReportError> {
        let xml = self.to_xml()?;
        let io_err = |source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, xml).map_err(io_err)
    }
}

struct XmlOut(Writer<Cursor<Vec<u8>>>);

impl XmlOut {
    fn event(&mut self, event: Event<'_>) -> Result<(), ReportError> {
        self.0
            .write_event(event)
            .map_err(|e| ReportError::Xml(e.to_string()))
    }

    fn start(&mut self, start: BytesStart<'_>) -> Result<(), ReportError> {
        self.event(Event::Start(start))
    }

    fn end(&mut self, name: &str) -> Result<(), ReportError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<(), ReportError> {
        self.start(BytesStart::new(name))?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }
}
