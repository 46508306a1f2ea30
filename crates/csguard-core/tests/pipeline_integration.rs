//! Integration test: configuration, discovery, analysis and reporting.
//!
//! Uses a small rule defined here so the pipeline is exercised without the
//! built-in analyzers.

use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use csguard_core::catalog::{RuleDescriptor, FILENAME_CLASS_MISMATCH};
use csguard_core::{
    syntax, Analyzer, Configuration, FileContext, Rule, RuleError, Severity, Violation,
    ViolationReport,
};
use tempfile::TempDir;

static DESCRIPTORS: [&RuleDescriptor; 1] = [&FILENAME_CLASS_MISMATCH];

/// Reports every top-level type whose name differs from the file stem.
struct StemMatch;

impl Rule for StemMatch {
    fn name(&self) -> &'static str {
        "stem-match"
    }

    fn descriptors(&self) -> &'static [&'static RuleDescriptor] {
        &DESCRIPTORS
    }

    fn check(&self, ctx: &FileContext<'_>) -> Result<Vec<Violation>, RuleError> {
        let stem = ctx.file_name().trim_end_matches(".cs");
        Ok(syntax::top_level_types(ctx.root())
            .into_iter()
            .filter(|t| t.name(ctx.content) != stem)
            .map(|t| {
                Violation::from_descriptor(
                    &FILENAME_CLASS_MISMATCH,
                    Severity::Warning,
                    ctx.location(t.name_node),
                    &[stem, t.name(ctx.content)],
                )
            })
            .collect())
    }
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    for (rel, content) in files {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, content).expect("write");
    }
    dir
}

fn run(root: &Path, config: Configuration) -> csguard_core::LintResult {
    Analyzer::builder()
        .root(root)
        .config(config)
        .rule(StemMatch)
        .build()
        .expect("analyzer should build")
        .analyze()
        .expect("analysis should succeed")
}

#[test]
fn generated_and_build_output_files_are_skipped() {
    let dir = project(&[
        ("Models/Ball.cs", "public class Paddle { }"),
        ("obj/Debug/Ball.cs", "public class Paddle { }"),
        ("Views/Main.g.cs", "public class Paddle { }"),
        ("Views/Form.Designer.cs", "public class Paddle { }"),
        ("Properties/AssemblyInfo.cs", "public class Paddle { }"),
    ]);
    let result = run(dir.path(), Configuration::default());
    assert_eq!(result.files_checked, 1);
    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].location.file, Path::new("Models/Ball.cs"));
}

#[test]
fn configuration_overrides_rule_severity_and_enablement() {
    let dir = project(&[("Ball.cs", "public class Paddle { }")]);

    let config = Configuration::parse(r#"{ "rules": { "CSG0502": { "severity": "error" } } }"#)
        .expect("config");
    assert_eq!(run(dir.path(), config).violations[0].severity, Severity::Error);

    let config = Configuration::parse(r#"{ "rules": { "filename-class-mismatch": { "enabled": false } } }"#)
        .expect("config");
    assert!(run(dir.path(), config).violations.is_empty());
}

#[test]
fn malformed_section_falls_back_to_defaults() {
    let config = Configuration::parse(
        r#"{ "classRegions": { "enabled": "yes" }, "thisQualifier": { "mandatory": true }, "unknown": 1 }"#,
    )
    .expect("config");
    assert_eq!(config.class_regions, Configuration::default().class_regions);
    assert!(config.this_qualifier.mandatory);
    assert_eq!(config.this_qualifier.severity(), Severity::Error);
}

#[test]
fn missing_config_file_uses_defaults() {
    let dir = TempDir::new().expect("tempdir");
    let config = Configuration::load_or_default(&dir.path().join("csguard.json"));
    assert_eq!(config, Configuration::default());
}

#[test]
fn user_exclude_patterns_apply_to_relative_paths() {
    let dir = project(&[
        ("Models/Ball.cs", "public class Paddle { }"),
        ("Legacy/Old.cs", "public class Ancient { }"),
    ]);
    let result = Analyzer::builder()
        .root(dir.path())
        .rule(StemMatch)
        .exclude("Legacy/**")
        .build()
        .expect("build")
        .analyze()
        .expect("analyze");
    assert_eq!(result.files_checked, 1);
}

#[test]
fn report_is_written_as_xml() {
    let dir = project(&[
        ("Ball.cs", "public class Paddle { }"),
        ("Broken.cs", "public class {"),
    ]);
    let result = run(dir.path(), Configuration::default());
    let report = ViolationReport::from_result("Game", &result, true)
        .with_timestamp(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("timestamp"));

    let out = dir.path().join("reports").join("csguard.xml");
    report.write_xml(&out).expect("write report");
    let xml = fs::read_to_string(&out).expect("read report");

    assert!(xml.contains("<ProjectName>Game</ProjectName>"));
    assert!(xml.contains("<Timestamp>2024-05-01T12:00:00Z</Timestamp>"));
    assert!(xml.contains(r#"<Rule Id="CSG0502" Name="filename-class-mismatch" Count="1">"#));
    assert!(xml.contains(r#"<Rule Id="CSG9001" Name="parse-failure" Count="1">"#));
    assert!(xml.contains("<TotalViolations>2</TotalViolations>"));
    assert!(xml.contains("<CriticalViolations>0</CriticalViolations>"));
    assert!(xml.contains("<BuildStatus>Success</BuildStatus>"));
}
