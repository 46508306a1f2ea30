//! # csguard-core
//!
//! Core framework for C# coding-standard analysis based on tree-sitter.
//!
//! This crate provides the foundational traits and types for building
//! analyzers over C# projects. It includes:
//!
//! - [`catalog`] with the static descriptor of every rule
//! - [`Configuration`] loaded from a JSON settings document
//! - [`SourceLoader`] and [`SourceFile`] for discovery and parsing
//! - [`Rule`], [`ProjectRule`] and [`FixProvider`] traits
//! - [`Analyzer`] for orchestrating validation and fixes
//! - [`ViolationReport`] with XML serialization
//!
//! ## Example
//!
//! ```ignore
//! use csguard_core::{Analyzer, Configuration, ViolationReport};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./MyApp")
//!     .config(Configuration::default())
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! let report = ViolationReport::from_result("MyApp", &result, true);
//! report.write_xml("csguard-report.xml".as_ref())?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
pub mod catalog;
mod config;
mod context;
mod fix;
mod report;
mod rule;
mod source;
pub mod syntax;
mod types;

/// Utility modules for rule implementations.
pub mod utils;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError, FixSummary};
pub use catalog::{Category, RuleDescriptor};
pub use config::{
    ClassFileOrganizationConfig, ClassRegionsConfig, ConfigError, Configuration, DeclarationKind,
    FolderStructureConfig, MethodRegionsConfig, RuleConfig, SourceLoaderConfig,
    ThisQualifierConfig, XmlDocumentationConfig, AnalyzerConfig,
};
pub use context::{FileContext, ProjectContext};
pub use fix::{CodeFixEdit, FixError};
pub use report::{BuildStatus, ReportError, RuleGroup, Summary, ViolationReport};
pub use rule::{
    FixProvider, FixProviderBox, ProjectRule, ProjectRuleBox, Rule, RuleBox, RuleError,
};
pub use source::{ParseFailure, SourceFile, SourceLoader};
pub use types::{LintResult, Location, Severity, Suggestion, Violation, ViolationDiagnostic};
