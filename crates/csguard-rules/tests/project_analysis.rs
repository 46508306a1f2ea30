//! Integration test: built-in rules end-to-end via Analyzer.
//!
//! Each test lays out a small C# project in a temporary directory, runs the
//! configured analyzers over it and checks the merged, sorted result.

use std::fs;
use std::path::Path;

use csguard_core::{Analyzer, Configuration, LintResult, Severity, ViolationReport};
use csguard_rules::{all_fix_providers, project_rules_from_config, rules_from_config};
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    for (rel, content) in files {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, content).expect("write");
    }
    dir
}

fn analyzer(root: &Path, config: Configuration, enhanced: bool) -> Analyzer {
    let mut builder = Analyzer::builder()
        .root(root)
        .config(config.clone())
        .enforce_enhanced_standards(enhanced);
    for rule in rules_from_config(&config, enhanced) {
        builder = builder.rule_box(rule);
    }
    for rule in project_rules_from_config(&config) {
        builder = builder.project_rule_box(rule);
    }
    for provider in all_fix_providers(&config) {
        builder = builder.fix_provider_box(provider);
    }
    builder.build().expect("analyzer should build")
}

/// Only the given section enabled.
fn only(section: &str) -> Configuration {
    let mut config = Configuration::default();
    config.folder_structure.enabled = section == "folderStructure";
    config.method_regions.enabled = section == "methodRegions";
    config.class_regions.enabled = section == "classRegions";
    config.xml_documentation.enabled = section == "xmlDocumentation";
    config.this_qualifier.enforce_this_qualifier = section == "thisQualifier";
    config.class_file_organization.enabled = section == "classFileOrganization";
    config
}

fn codes(result: &LintResult) -> Vec<&str> {
    result.violations.iter().map(|v| v.code.as_str()).collect()
}

const BALL: &str = r"namespace Game.Models
{
    public class Ball
    {
        public double Radius { get; set; }

        public double Diameter()
        {
            return Radius * 2;
        }
    }
}
";

// ── Folder structure ──

#[test]
fn misplaced_interfaces_reported_once_each() {
    let dir = project(&[
        ("Models/IShape.cs", "namespace Game.Models\n{\n    public interface IShape { }\n}\n"),
        ("Interfaces/IArea.cs", "namespace Game.Interfaces\n{\n    public interface IArea { }\n}\n"),
    ]);
    let result = analyzer(dir.path(), only("folderStructure"), false)
        .analyze()
        .expect("analysis");

    assert_eq!(codes(&result), ["CSG0101"]);
    let v = &result.violations[0];
    assert_eq!(v.location.file, Path::new("Models/IShape.cs"));
    assert_eq!((v.location.line, v.location.column), (3, 22));
    assert!(v.fixable);
}

#[test]
fn missing_required_folder_is_project_level() {
    let dir = project(&[("Models/Ball.cs", BALL)]);
    let mut config = only("folderStructure");
    config.folder_structure.required_folders = ["Models".to_string(), "Services".to_string()].into();
    let result = analyzer(dir.path(), config, false).analyze().expect("analysis");
    assert_eq!(codes(&result), ["CSG0105"]);
    assert!(result.violations[0].message.contains("'Services'"));
}

// ── Self-qualifier and its fix ──

#[test]
fn unqualified_property_reported_as_error() {
    let dir = project(&[("Models/Ball.cs", BALL)]);
    let result = analyzer(dir.path(), only("thisQualifier"), false)
        .analyze()
        .expect("analysis");

    assert_eq!(codes(&result), ["CSG0401"]);
    let v = &result.violations[0];
    assert_eq!(v.severity, Severity::Error);
    assert_eq!((v.location.line, v.location.column), (9, 20));
    assert!(v.fixable);
}

#[test]
fn applying_the_fix_clears_the_diagnostic() {
    let dir = project(&[("Models/Ball.cs", BALL)]);
    let analyzer = analyzer(dir.path(), only("thisQualifier"), false);

    let summary = analyzer.apply_fixes(&[], false).expect("fix");
    assert_eq!(summary.edits.len(), 1);
    assert_eq!(summary.files_changed, 1);

    let fixed = fs::read_to_string(dir.path().join("Models/Ball.cs")).expect("read");
    assert!(fixed.contains("return this.Radius * 2;"));
    assert!(analyzer.analyze().expect("analysis").violations.is_empty());

    let again = analyzer.apply_fixes(&[], false).expect("fix");
    assert!(again.edits.is_empty());
}

#[test]
fn dry_run_leaves_files_untouched() {
    let dir = project(&[("Models/Ball.cs", BALL)]);
    let analyzer = analyzer(dir.path(), only("thisQualifier"), false);
    let summary = analyzer.apply_fixes(&[], true).expect("fix");
    assert_eq!(summary.edits.len(), 1);
    let text = fs::read_to_string(dir.path().join("Models/Ball.cs")).expect("read");
    assert_eq!(text, BALL);
}

#[test]
fn fix_filter_restricts_rules() {
    let dir = project(&[("Models/Ball.cs", BALL)]);
    let analyzer = analyzer(dir.path(), only("thisQualifier"), false);
    let summary = analyzer
        .apply_fixes(&["interface-placement".to_string()], false)
        .expect("fix");
    assert!(summary.edits.is_empty());
}

// ── File organization ──

#[test]
fn file_organization_properties() {
    let dir = project(&[
        ("Models/Ball.cs", BALL),
        (
            "Models/Shapes.cs",
            "public class Square { }\npublic class Circle { }\npublic class Triangle { }\n",
        ),
        ("Views/MainWindow.xaml", "<Window/>"),
        ("Views/MainWindow.xaml.cs", "public partial class MainWindow { }\n"),
    ]);
    let result = analyzer(dir.path(), only("classFileOrganization"), false)
        .analyze()
        .expect("analysis");

    assert_eq!(codes(&result), ["CSG0501"]);
    assert_eq!(
        result.violations[0].message,
        "File declares 3 classes (Square, Circle, Triangle); each class belongs in its own file"
    );
}

#[test]
fn enhanced_standards_force_error_severity() {
    let dir = project(&[("Models/Paddle.cs", "public class Ball { }\n")]);
    let mut config = only("classFileOrganization");
    config.class_file_organization.enforcement_level = Severity::Warning;

    let relaxed = analyzer(dir.path(), config.clone(), false).analyze().expect("analysis");
    assert_eq!(relaxed.violations[0].severity, Severity::Warning);

    let enhanced = analyzer(dir.path(), config, true).analyze().expect("analysis");
    assert_eq!(enhanced.violations[0].severity, Severity::Error);
}

// ── Infrastructure diagnostics and reporting ──

#[test]
fn unparseable_file_is_reported_and_skipped() {
    let dir = project(&[
        ("Models/Ball.cs", BALL),
        ("Models/Broken.cs", "public class Broken {\n    public void Run( {\n"),
    ]);
    let result = analyzer(dir.path(), Configuration::default(), false)
        .analyze()
        .expect("analysis");
    assert_eq!(result.files_failed, 1);
    let failures: Vec<_> = result
        .violations
        .iter()
        .filter(|v| v.code == "CSG9001")
        .collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].severity, Severity::Warning);
    assert_eq!(failures[0].location.file, Path::new("Models/Broken.cs"));
}

#[test]
fn report_totals_match_violations() {
    let dir = project(&[("Models/Ball.cs", BALL), ("Models/IShape.cs", "public interface IShape { }\n")]);
    let result = analyzer(dir.path(), Configuration::default(), false)
        .analyze()
        .expect("analysis");
    assert!(!result.violations.is_empty());

    let report = ViolationReport::from_result("Game", &result, true);
    assert_eq!(report.summary.total, result.violations.len());
    assert_eq!(
        report.groups.iter().map(|g| g.violations.len()).sum::<usize>(),
        result.violations.len()
    );
    assert_eq!(report.summary.build_status.label(), "Failed");
    assert_eq!(report.exit_code(), 1);

    let lenient = ViolationReport::from_result("Game", &result, false);
    assert_eq!(lenient.summary.build_status.label(), "Success");
    assert_eq!(lenient.exit_code(), 0);
}

#[test]
fn results_are_sorted_by_code_then_location() {
    let dir = project(&[
        ("B/IZeta.cs", "public interface IZeta { }\n"),
        ("A/IAlpha.cs", "public interface IAlpha { }\n"),
    ]);
    let mut config = Configuration::default();
    config.class_file_organization.enabled = false;
    config.xml_documentation.enabled = false;
    let result = analyzer(dir.path(), config, false).analyze().expect("analysis");
    let files: Vec<_> = result
        .violations
        .iter()
        .filter(|v| v.code == "CSG0101")
        .map(|v| v.location.file.clone())
        .collect();
    assert_eq!(files, [Path::new("A/IAlpha.cs"), Path::new("B/IZeta.cs")]);
    let mut sorted = codes(&result);
    sorted.sort_unstable();
    assert_eq!(codes(&result), sorted);
}
