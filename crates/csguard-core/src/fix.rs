//! Code-fix edits.

use std::path::PathBuf;

/// Errors applying an edit to file text.
#[derive(Debug, thiserror::Error)]
pub enum FixError {
    /// The span lies outside the text or splits a UTF-8 character.
    #[error("edit span {start}..{end} is not valid for a text of {len} bytes")]
    InvalidSpan {
        /// Span start.
        start: usize,
        /// Span end.
        end: usize,
        /// Text length.
        len: usize,
    },

    /// Writing the fixed file failed.
    #[error("Failed to write {path}: {source}")]
    Io {
        /// Target file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// A single text replacement produced by a fix provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFixEdit {
    /// Project-relative path of the target file.
    pub file: PathBuf,
    /// Start byte offset.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Replacement text.
    pub replacement: String,
    /// Human-readable description.
    pub description: String,
}

impl CodeFixEdit {
    /// Applies the edit to `text`, returning the new text.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::InvalidSpan`] when the span does not fit `text`.
    pub fn apply(&self, text: &str) -> Result<String, FixError> {
        let invalid = || FixError::InvalidSpan {
            start: self.start,
            end: self.end,
            len: text.len(),
        };
        if self.start > self.end {
            return Err(invalid());
        }
        let before = text.get(..self.start).ok_or_else(invalid)?;
        let after = text.get(self.end..).ok_or_else(invalid)?;
        let mut out = String::with_capacity(text.len() + self.replacement.len());
        out.push_str(before);
        out.push_str(&self.replacement);
        out.push_str(after);
        Ok(out)
    }

    /// Whether applying the edit to `text` would change nothing.
    #[must_use]
    pub fn is_noop(&self, text: &str) -> bool {
        text.get(self.start..self.end) == Some(self.replacement.as_str())
    }
}
