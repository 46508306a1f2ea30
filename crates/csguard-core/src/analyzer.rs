//! Validation orchestrator.
//!
//! The [`Analyzer`] discovers and parses the project's C# files, runs every
//! registered rule over each parsed file on a rayon pool, runs project-wide
//! rules, resolves severities and returns a deterministically sorted
//! [`LintResult`]. It also drives the explicit fix action.

use crate::catalog::{self, Category, ANALYSIS_TIMEOUT, RULE_EVALUATION_FAILURE};
use crate::config::Configuration;
use crate::context::{FileContext, ProjectContext};
use crate::fix::{CodeFixEdit, FixError};
use crate::rule::{FixProvider, FixProviderBox, ProjectRule, ProjectRuleBox, Rule, RuleBox, RuleError};
use crate::source::{SourceFile, SourceLoader};
use crate::types::{LintResult, Location, Severity, Violation};

use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Upper bound on fix passes per file.
const MAX_FIX_PASSES: usize = 500;

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The project root does not exist.
    #[error("Project root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// The worker pool could not be created.
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Applying a fix failed.
    #[error("Fix failed: {0}")]
    Fix(#[from] FixError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    project_rules: Vec<ProjectRuleBox>,
    fix_providers: Vec<FixProviderBox>,
    exclude_patterns: Vec<String>,
    config: Option<Configuration>,
    enforce_enhanced_standards: bool,
    parallelism: Option<usize>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project root to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a per-file rule.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed per-file rule.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds a project-wide rule.
    #[must_use]
    pub fn project_rule<R: ProjectRule + 'static>(mut self, rule: R) -> Self {
        self.project_rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed project-wide rule.
    #[must_use]
    pub fn project_rule_box(mut self, rule: ProjectRuleBox) -> Self {
        self.project_rules.push(rule);
        self
    }

    /// Adds a code-fix provider.
    #[must_use]
    pub fn fix_provider<F: FixProvider + 'static>(mut self, provider: F) -> Self {
        self.fix_providers.push(Box::new(provider));
        self
    }

    /// Adds a boxed code-fix provider.
    #[must_use]
    pub fn fix_provider_box(mut self, provider: FixProviderBox) -> Self {
        self.fix_providers.push(provider);
        self
    }

    /// Adds an exclude glob pattern, matched against project-relative paths.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Configuration) -> Self {
        self.config = Some(config);
        self
    }

    /// Forces self-qualifier and file-organization violations to `Error`.
    #[must_use]
    pub fn enforce_enhanced_standards(mut self, enforce: bool) -> Self {
        self.enforce_enhanced_standards = enforce;
        self
    }

    /// Sets the worker count (default: configuration, then available cores).
    #[must_use]
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory doesn't exist.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let root = self.root.unwrap_or_else(|| PathBuf::from("."));
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };
        if !root.is_dir() {
            return Err(AnalyzerError::RootNotFound(root));
        }

        let config = self.config.unwrap_or_default();
        let parallelism = self.parallelism.or(config.analyzer.parallelism);

        Ok(Analyzer {
            root,
            rules: self.rules,
            project_rules: self.project_rules,
            fix_providers: self.fix_providers,
            exclude_patterns: self.exclude_patterns,
            config,
            enforce_enhanced_standards: self.enforce_enhanced_standards,
            parallelism,
        })
    }
}

/// Summary of an explicit fix run.
#[derive(Debug, Default, Clone)]
pub struct FixSummary {
    /// Every edit applied, in application order.
    pub edits: Vec<CodeFixEdit>,
    /// Number of files that changed.
    pub files_changed: usize,
}

/// The main analyzer that orchestrates validation.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleBox>,
    project_rules: Vec<ProjectRuleBox>,
    fix_providers: Vec<FixProviderBox>,
    exclude_patterns: Vec<String>,
    config: Configuration,
    enforce_enhanced_standards: bool,
    parallelism: Option<usize>,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configuration snapshot in use.
    #[must_use]
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len() + self.project_rules.len()
    }

    fn loader(&self) -> SourceLoader {
        SourceLoader::new(&self.root, self.config.source_loader.clone())
            .with_excludes(self.exclude_patterns.iter().cloned())
    }

    fn time_limit(&self) -> Option<Duration> {
        match self.config.analyzer.file_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Analyzes every file and project rule and returns sorted results.
    ///
    /// Per-file problems (unparseable files, failing or slow rules) become
    /// infrastructure diagnostics; only setup failures are returned as errors.
    ///
    /// # Errors
    ///
    /// Returns an error if an exclude pattern is invalid or the worker pool
    /// cannot be created.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {}", self.root.display());

        let files = self.loader().load_all()?;
        info!("Found {} files to analyze", files.len());

        let mut pool = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = self.parallelism {
            pool = pool.num_threads(threads);
        }
        let pool = pool.build()?;

        let per_file: Vec<Vec<Violation>> =
            pool.install(|| files.par_iter().map(|f| self.analyze_file(f)).collect());

        let mut result = LintResult::new();
        for (file, violations) in files.iter().zip(per_file) {
            if file.is_parsed() {
                result.files_checked += 1;
            } else {
                result.files_failed += 1;
            }
            result.violations.extend(violations);
        }

        let project_ctx = ProjectContext::new(&self.root)
            .with_source_files(files.iter().map(|f| f.path.clone()).collect());
        for rule in &self.project_rules {
            if !self.any_enabled(rule.descriptors()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }
            let violations = rule.check_project(&project_ctx);
            result.violations.extend(self.finalize(violations, None));
        }

        result.sort();
        info!(
            "Analysis complete: {} violations in {} files ({} unparseable)",
            result.violations.len(),
            result.files_checked,
            result.files_failed
        );
        Ok(result)
    }

    /// Runs every per-file rule over one loaded file.
    ///
    /// An unparseable file yields only its parse-failure diagnostic.
    #[must_use]
    pub fn analyze_file(&self, file: &SourceFile) -> Vec<Violation> {
        debug!("Analyzing: {}", file.relative_path.display());

        let Some(ctx) = FileContext::from_source(file) else {
            warn!("Skipping unparseable file {}", file.relative_path.display());
            return file
                .parse_failure_violation()
                .into_iter()
                .filter(|v| self.is_enabled(&v.code))
                .collect();
        };

        let ctx = match self.time_limit() {
            Some(limit) => ctx.with_time_limit(limit),
            None => ctx,
        };

        let mut violations = Vec::new();
        for rule in &self.rules {
            if !self.any_enabled(rule.descriptors()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }
            let found = self.run_rule(rule.as_ref(), &ctx);
            violations.extend(self.finalize(found, Some(file)));
        }
        violations
    }

    /// Runs one rule in isolation, converting failures into diagnostics.
    fn run_rule(&self, rule: &dyn Rule, ctx: &FileContext<'_>) -> Vec<Violation> {
        let location = || Location::new(ctx.relative_path.to_path_buf(), 1, 1);
        match catch_unwind(AssertUnwindSafe(|| rule.check(ctx))) {
            Ok(Ok(violations)) => violations,
            Ok(Err(RuleError::Timeout { limit_ms, .. })) => {
                warn!(
                    "Rule {} timed out on {}",
                    rule.name(),
                    ctx.relative_path.display()
                );
                vec![Violation::from_descriptor(
                    &ANALYSIS_TIMEOUT,
                    ANALYSIS_TIMEOUT.default_severity,
                    location(),
                    &[&limit_ms.to_string(), rule.name()],
                )]
            }
            Ok(Err(RuleError::Evaluation(message))) => {
                warn!(
                    "Rule {} failed on {}: {message}",
                    rule.name(),
                    ctx.relative_path.display()
                );
                vec![Violation::from_descriptor(
                    &RULE_EVALUATION_FAILURE,
                    RULE_EVALUATION_FAILURE.default_severity,
                    location(),
                    &[rule.name(), &message],
                )]
            }
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(ToString::to_string)
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "analyzer panicked".to_string());
                warn!(
                    "Rule {} panicked on {}: {message}",
                    rule.name(),
                    ctx.relative_path.display()
                );
                vec![Violation::from_descriptor(
                    &RULE_EVALUATION_FAILURE,
                    RULE_EVALUATION_FAILURE.default_severity,
                    location(),
                    &[rule.name(), &message],
                )]
            }
        }
    }

    fn is_enabled(&self, code: &str) -> bool {
        catalog::lookup(code).map_or(true, |d| self.config.is_rule_enabled(d))
    }

    fn any_enabled(&self, descriptors: &[&catalog::RuleDescriptor]) -> bool {
        descriptors.iter().any(|d| self.config.is_rule_enabled(d))
    }

    /// Drops disabled codes, resolves severities and marks fixable diagnostics.
    fn finalize(&self, violations: Vec<Violation>, file: Option<&SourceFile>) -> Vec<Violation> {
        violations
            .into_iter()
            .filter(|v| self.is_enabled(&v.code))
            .map(|mut v| {
                v.severity = self.resolve_severity(&v);
                if let Some(file) = file {
                    v.fixable = self.edit_for(file, &v).is_some();
                }
                v
            })
            .collect()
    }

    fn resolve_severity(&self, violation: &Violation) -> Severity {
        let Some(descriptor) = catalog::lookup(&violation.code) else {
            return violation.severity;
        };
        let forced = match descriptor.category {
            Category::ThisQualifier => {
                self.enforce_enhanced_standards || self.config.this_qualifier.mandatory
            }
            Category::FileOrganization => self.enforce_enhanced_standards,
            _ => false,
        };
        if forced {
            return Severity::Error;
        }
        self.config
            .rule_severity(descriptor)
            .unwrap_or(violation.severity)
    }

    fn edit_for(&self, file: &SourceFile, violation: &Violation) -> Option<CodeFixEdit> {
        self.fix_providers
            .iter()
            .filter(|p| p.handles(violation))
            .find_map(|p| p.provide(file, violation))
            .filter(|edit| !edit.is_noop(&file.text))
    }

    /// Applies available fixes, one edit at a time per file.
    ///
    /// After every edit the file is re-parsed and re-analyzed before the next
    /// edit is chosen. `only` restricts fixes to the given rule codes or
    /// names; an empty slice means every fixable rule. With `dry_run` the
    /// edits are computed in memory and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails, an edit span is invalid, or a
    /// fixed file cannot be written.
    pub fn apply_fixes(&self, only: &[String], dry_run: bool) -> Result<FixSummary, AnalyzerError> {
        let mut summary = FixSummary::default();
        for file in self.loader().load_all()? {
            let edits = self.fix_file(file, only, dry_run)?;
            if !edits.is_empty() {
                summary.files_changed += 1;
                summary.edits.extend(edits);
            }
        }
        info!(
            "Applied {} fixes in {} files{}",
            summary.edits.len(),
            summary.files_changed,
            if dry_run { " (dry run)" } else { "" }
        );
        Ok(summary)
    }

    fn fix_file(
        &self,
        mut file: SourceFile,
        only: &[String],
        dry_run: bool,
    ) -> Result<Vec<CodeFixEdit>, AnalyzerError> {
        let mut applied = Vec::new();
        for _ in 0..MAX_FIX_PASSES {
            let Some(edit) = self
                .analyze_file(&file)
                .iter()
                .filter(|v| v.fixable)
                .filter(|v| only.is_empty() || only.iter().any(|k| matches_key(v, k)))
                .find_map(|v| self.edit_for(&file, v))
            else {
                return Ok(applied);
            };

            let text = edit.apply(&file.text)?;
            debug!("{}: {}", file.relative_path.display(), edit.description);
            if !dry_run {
                std::fs::write(&file.path, &text).map_err(|source| FixError::Io {
                    path: file.path.clone(),
                    source,
                })?;
            }
            file = SourceFile::parse(file.path, file.relative_path, text);
            applied.push(edit);
        }
        warn!(
            "Stopped fixing {} after {MAX_FIX_PASSES} passes",
            file.relative_path.display()
        );
        Ok(applied)
    }
}

fn matches_key(violation: &Violation, key: &str) -> bool {
    violation.code.eq_ignore_ascii_case(key) || violation.rule.eq_ignore_ascii_case(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{RuleDescriptor, MULTIPLE_CLASSES, THIS_QUALIFIER};
    use crate::config::RuleConfig;
    use std::fs;
    use tempfile::TempDir;

    static CLASS_COUNTER_DESCRIPTORS: [&RuleDescriptor; 1] = [&MULTIPLE_CLASSES];
    static QUALIFIER_DESCRIPTORS: [&RuleDescriptor; 1] = [&THIS_QUALIFIER];

    struct ClassCounter;

    impl Rule for ClassCounter {
        fn name(&self) -> &'static str {
            "class-counter"
        }

        fn descriptors(&self) -> &'static [&'static RuleDescriptor] {
            &CLASS_COUNTER_DESCRIPTORS
        }

        fn check(&self, ctx: &FileContext<'_>) -> Result<Vec<Violation>, RuleError> {
            let types = crate::syntax::top_level_types(ctx.root());
            if types.len() < 2 {
                return Ok(Vec::new());
            }
            Ok(vec![Violation::from_descriptor(
                &MULTIPLE_CLASSES,
                Severity::Warning,
                ctx.location(types[1].name_node),
                &[&types.len().to_string(), "..."],
            )])
        }
    }

    struct Panicking;

    impl Rule for Panicking {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn descriptors(&self) -> &'static [&'static RuleDescriptor] {
            &QUALIFIER_DESCRIPTORS
        }

        #[allow(clippy::panic)]
        fn check(&self, _ctx: &FileContext<'_>) -> Result<Vec<Violation>, RuleError> {
            panic!("boom")
        }
    }

    struct Failing;

    impl Rule for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn descriptors(&self) -> &'static [&'static RuleDescriptor] {
            &QUALIFIER_DESCRIPTORS
        }

        fn check(&self, _ctx: &FileContext<'_>) -> Result<Vec<Violation>, RuleError> {
            Err(RuleError::Evaluation("unsupported construct".to_string()))
        }
    }

    struct Unqualified;

    impl Rule for Unqualified {
        fn name(&self) -> &'static str {
            "unqualified"
        }

        fn descriptors(&self) -> &'static [&'static RuleDescriptor] {
            &QUALIFIER_DESCRIPTORS
        }

        fn check(&self, ctx: &FileContext<'_>) -> Result<Vec<Violation>, RuleError> {
            Ok(vec![Violation::from_descriptor(
                &THIS_QUALIFIER,
                Severity::Error,
                ctx.location(ctx.root()),
                &["property", "Radius"],
            )])
        }
    }

    struct Slow;

    impl Rule for Slow {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn descriptors(&self) -> &'static [&'static RuleDescriptor] {
            &QUALIFIER_DESCRIPTORS
        }

        fn check(&self, ctx: &FileContext<'_>) -> Result<Vec<Violation>, RuleError> {
            std::thread::sleep(Duration::from_millis(20));
            ctx.check_deadline()?;
            Ok(Vec::new())
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

    #[test]
    fn test_builder_rejects_missing_root() {
        let result = Analyzer::builder().root("/definitely/not/here").build();
        assert!(matches!(result, Err(AnalyzerError::RootNotFound(_))));
    }

    #[test]
    fn analyze_counts_checked_and_failed_files() {
        let dir = project(&[
            ("A.cs", "class A {} class B {}"),
            ("C.cs", "class C {}"),
            ("Broken.cs", "class {"),
        ]);
        let analyzer = Analyzer::builder()
            .root(dir.path())
            .rule(ClassCounter)
            .parallelism(2)
            .build()
            .expect("build");
        let result = analyzer.analyze().expect("analyze");

        assert_eq!(result.files_checked, 2);
        assert_eq!(result.files_failed, 1);
        let codes: Vec<_> = result.violations.iter().map(|v| v.code.as_str()).collect();
        assert_eq!(codes, vec!["CSG0501", "CSG9001"]);
    }

    #[test]
    fn panics_and_errors_become_infrastructure_diagnostics() {
        let dir = project(&[("A.cs", "class A {}")]);
        let analyzer = Analyzer::builder()
            .root(dir.path())
            .rule(Panicking)
            .rule(Failing)
            .rule(ClassCounter)
            .build()
            .expect("build");
        let result = analyzer.analyze().expect("analyze");

        assert_eq!(result.files_checked, 1);
        assert_eq!(result.violations.len(), 2);
        assert!(result.violations.iter().all(|v| v.code == "CSG9002"));
        assert!(result.violations.iter().all(|v| v.severity == Severity::Warning));
        assert!(result.violations.iter().any(|v| v.message.contains("boom")));
        assert!(result
            .violations
            .iter()
            .any(|v| v.message.contains("unsupported construct")));
    }

    #[test]
    fn slow_rules_report_analysis_timeout() {
        let dir = project(&[("A.cs", "class A {}")]);
        let mut config = Configuration::default();
        config.analyzer.file_timeout_ms = 1;
        let analyzer = Analyzer::builder()
            .root(dir.path())
            .rule(Slow)
            .config(config)
            .build()
            .expect("build");
        let result = analyzer.analyze().expect("analyze");

        assert_eq!(result.violations.len(), 1);
        let v = &result.violations[0];
        assert_eq!(v.code, "CSG9003");
        assert_eq!(v.severity, Severity::Warning);
        assert!(v.message.contains("1 ms"), "{}", v.message);
        assert!(v.message.contains("'slow'"), "{}", v.message);
    }

    #[test]
    fn config_overrides_severity_and_disables_rules() {
        let dir = project(&[("A.cs", "class A {} class B {}")]);
        let mut config = Configuration::default();
        config.rules.insert(
            "multiple-classes".to_string(),
            RuleConfig {
                enabled: None,
                severity: Some(Severity::Error),
            },
        );
        let analyzer = Analyzer::builder()
            .root(dir.path())
            .rule(ClassCounter)
            .config(config.clone())
            .build()
            .expect("build");
        let result = analyzer.analyze().expect("analyze");
        assert_eq!(result.violations[0].severity, Severity::Error);

        config.rules.insert(
            "CSG0501".to_string(),
            RuleConfig {
                enabled: Some(false),
                severity: None,
            },
        );
        config.rules.remove("multiple-classes");
        let analyzer = Analyzer::builder()
            .root(dir.path())
            .rule(ClassCounter)
            .config(config)
            .build()
            .expect("build");
        assert!(analyzer.analyze().expect("analyze").violations.is_empty());
    }

    #[test]
    fn mandatory_qualifier_ignores_severity_override() {
        let dir = project(&[("A.cs", "class A {}")]);
        let mut config = Configuration::default();
        config.rules.insert(
            "this-qualifier".to_string(),
            RuleConfig {
                enabled: None,
                severity: Some(Severity::Warning),
            },
        );
        let analyze = |config: Configuration| {
            Analyzer::builder()
                .root(dir.path())
                .rule(Unqualified)
                .config(config)
                .build()
                .expect("build")
                .analyze()
                .expect("analyze")
        };

        let relaxed = analyze(config.clone());
        assert_eq!(relaxed.violations[0].severity, Severity::Warning);

        config.this_qualifier.mandatory = true;
        let mandatory = analyze(config);
        assert_eq!(mandatory.violations[0].severity, Severity::Error);
    }

    #[test]
    fn enhanced_standards_force_error() {
        let dir = project(&[("A.cs", "class A {} class B {}")]);
        let analyzer = Analyzer::builder()
            .root(dir.path())
            .rule(ClassCounter)
            .enforce_enhanced_standards(true)
            .build()
            .expect("build");
        let result = analyzer.analyze().expect("analyze");
        assert_eq!(result.violations[0].severity, Severity::Error);
    }

    #[test]
    fn excludes_skip_files() {
        let dir = project(&[("Legacy/A.cs", "class A {} class B {}")]);
        let analyzer = Analyzer::builder()
            .root(dir.path())
            .rule(ClassCounter)
            .exclude("Legacy/**")
            .build()
            .expect("build");
        let result = analyzer.analyze().expect("analyze");
        assert_eq!(result.files_checked, 0);
        assert!(result.violations.is_empty());
    }
}
