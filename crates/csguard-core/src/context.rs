//! Context types for rule execution.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tree_sitter::{Node, Tree};

use crate::rule::RuleError;
use crate::source::SourceFile;
use crate::types::Location;

/// Context provided to per-file rules.
///
/// Only built for files that parsed without errors, so the tree is always
/// present. Analyzers call [`FileContext::check_deadline`] while walking so
/// that a runaway analysis stops at the per-file limit.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Absolute path to the file.
    pub path: &'a Path,
    /// Path relative to the project root.
    pub relative_path: &'a Path,
    /// File contents.
    pub content: &'a str,
    /// Parsed syntax tree.
    pub tree: &'a Tree,
    started: Instant,
    limit: Option<Duration>,
}

impl<'a> FileContext<'a> {
    /// Creates a context for a parsed file; `None` if the file has no tree.
    #[must_use]
    pub fn from_source(file: &'a SourceFile) -> Option<Self> {
        let tree = file.tree.as_ref()?;
        Some(Self {
            path: &file.path,
            relative_path: &file.relative_path,
            content: &file.text,
            tree,
            started: Instant::now(),
            limit: None,
        })
    }

    /// Sets the per-file time budget, measured from now.
    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.started = Instant::now();
        self.limit = Some(limit);
        self
    }

    /// Root node of the syntax tree.
    #[must_use]
    pub fn root(&self) -> Node<'a> {
        self.tree.root_node()
    }

    /// Fails with [`RuleError::Timeout`] once the time budget is spent.
    ///
    /// # Errors
    ///
    /// Returns a timeout error when the deadline has passed.
    pub fn check_deadline(&self) -> Result<(), RuleError> {
        let Some(limit) = self.limit else {
            return Ok(());
        };
        let elapsed = self.started.elapsed();
        if elapsed > limit {
            return Err(RuleError::Timeout {
                elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                limit_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            });
        }
        Ok(())
    }

    /// Location of a node, reported against the relative path.
    #[must_use]
    pub fn location(&self, node: Node<'_>) -> Location {
        Location::from_node(self.relative_path.to_path_buf(), node)
    }

    /// Source text of a node.
    #[must_use]
    pub fn text(&self, node: Node<'_>) -> &'a str {
        crate::syntax::node_text(node, self.content)
    }

    /// File name without directories (e.g., `Ball.xaml.cs`).
    #[must_use]
    pub fn file_name(&self) -> &'a str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Context provided to project-wide rules.
#[derive(Debug, Clone)]
pub struct ProjectContext<'a> {
    /// Root directory of the project.
    pub root: &'a Path,
    /// All discovered C# source files.
    pub source_files: Vec<PathBuf>,
}

impl<'a> ProjectContext<'a> {
    /// Creates a new project context.
    #[must_use]
    pub fn new(root: &'a Path) -> Self {
        Self {
            root,
            source_files: Vec::new(),
        }
    }

    /// Sets the list of source files.
    #[must_use]
    pub fn with_source_files(mut self, files: Vec<PathBuf>) -> Self {
        self.source_files = files;
        self
    }
}
