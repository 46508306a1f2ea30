//! Source discovery and parsing.

use std::path::{Path, PathBuf};

use glob::Pattern;
use ignore::WalkBuilder;
use tracing::{debug, warn};
use tree_sitter::Tree;

use crate::catalog::PARSE_FAILURE;
use crate::config::SourceLoaderConfig;
use crate::syntax;
use crate::types::{Location, Violation};

/// Where and why a file could not be turned into a syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// Line of the first error (1-indexed), 0 when the file was unreadable.
    pub line: usize,
    /// Column of the first error (1-indexed).
    pub column: usize,
    /// Byte offset of the first error.
    pub offset: usize,
    /// Description of the failure.
    pub message: String,
}

impl ParseFailure {
    fn unreadable(message: impl Into<String>) -> Self {
        Self {
            line: 0,
            column: 0,
            offset: 0,
            message: message.into(),
        }
    }
}

/// A loaded C# file.
///
/// Immutable once loaded. When parsing fails, `tree` is `None` and
/// `parse_failure` describes the first error.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the project root.
    pub relative_path: PathBuf,
    /// Raw file text.
    pub text: String,
    /// Parsed syntax tree, present only for error-free files.
    pub tree: Option<Tree>,
    /// First parse problem, if any.
    pub parse_failure: Option<ParseFailure>,
}

impl SourceFile {
    /// Parses `text` as C#.
    #[must_use]
    pub fn parse(path: PathBuf, relative_path: PathBuf, text: String) -> Self {
        let (tree, parse_failure) = match syntax::parse(&text) {
            None => (
                None,
                Some(ParseFailure::unreadable("parser produced no syntax tree")),
            ),
            Some(tree) => match syntax::first_error(tree.root_node()) {
                None => (Some(tree), None),
                Some(node) => {
                    let pos = node.start_position();
                    let what = if node.is_missing() {
                        format!("missing '{}'", node.kind())
                    } else {
                        "syntax error".to_string()
                    };
                    let failure = ParseFailure {
                        line: pos.row + 1,
                        column: pos.column + 1,
                        offset: node.start_byte(),
                        message: format!("{what} at line {}, column {}", pos.row + 1, pos.column + 1),
                    };
                    (None, Some(failure))
                }
            },
        };
        Self {
            path,
            relative_path,
            text,
            tree,
            parse_failure,
        }
    }

    /// Reads and parses a file. Read errors become a parse failure.
    #[must_use]
    pub fn load(path: &Path, root: &Path) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(path.to_path_buf(), relative_path, text),
            Err(e) => {
                warn!("Failed to read {}: {e}", path.display());
                Self {
                    path: path.to_path_buf(),
                    relative_path,
                    text: String::new(),
                    tree: None,
                    parse_failure: Some(ParseFailure::unreadable(format!("cannot read file: {e}"))),
                }
            }
        }
    }

    /// Whether the file parsed without errors.
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        self.tree.is_some()
    }

    /// Builds the infrastructure diagnostic for a failed file.
    #[must_use]
    pub fn parse_failure_violation(&self) -> Option<Violation> {
        let failure = self.parse_failure.as_ref()?;
        let location = Location::new(self.relative_path.clone(), failure.line.max(1), failure.column.max(1))
            .with_span(failure.offset, 0);
        Some(Violation::from_descriptor(
            &PARSE_FAILURE,
            PARSE_FAILURE.default_severity,
            location,
            &[&failure.message],
        ))
    }
}

/// Enumerates `.cs` files under a project root.
#[derive(Debug, Clone)]
pub struct SourceLoader {
    root: PathBuf,
    config: SourceLoaderConfig,
    extra_excludes: Vec<String>,
}

impl SourceLoader {
    /// Creates a loader for `root` with the given exclusion settings.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, config: SourceLoaderConfig) -> Self {
        Self {
            root: root.into(),
            config,
            extra_excludes: Vec::new(),
        }
    }

    /// Adds glob exclusions on top of the configured ones.
    #[must_use]
    pub fn with_excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_excludes.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Returns the project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists the C# files to analyze, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns an error if an exclusion pattern is not a valid glob.
    pub fn discover(&self) -> Result<Vec<PathBuf>, glob::PatternError> {
        let patterns = self
            .config
            .exclude
            .iter()
            .chain(&self.extra_excludes)
            .map(|p| Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let excluded_dirs: Vec<String> = self
            .config
            .excluded_directories
            .iter()
            .map(|d| d.to_lowercase())
            .collect();

        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(self.config.respect_gitignore)
            .git_exclude(self.config.respect_gitignore)
            .git_global(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir
                    && entry.depth() > 0
                    && excluded_dirs.contains(&entry.file_name().to_string_lossy().to_lowercase()))
            });

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Skipping unreadable entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.path();
            if !path
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("cs"))
            {
                continue;
            }
            if self.is_excluded(path, &patterns) {
                debug!("Excluding: {}", path.display());
                continue;
            }
            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    fn is_excluded(&self, path: &Path, patterns: &[Pattern]) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        if self
            .config
            .excluded_suffixes
            .iter()
            .any(|s| name.ends_with(s.as_str()))
        {
            return true;
        }
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let relative = relative.to_string_lossy().replace('\\', "/");
        patterns.iter().any(|p| p.matches(&relative))
    }

    /// Discovers, reads and parses every file.
    ///
    /// # Errors
    ///
    /// Returns an error if an exclusion pattern is not a valid glob.
    pub fn load_all(&self) -> Result<Vec<SourceFile>, glob::PatternError> {
        Ok(self
            .discover()?
            .iter()
            .map(|p| SourceFile::load(p, &self.root))
            .collect())
    }
}
