//! Path utilities for placement and naming checks.
//!
//! Folder comparisons are case-insensitive and accept both `/` and `\` as
//! separators, so configuration written on Windows works unchanged elsewhere.

use std::path::{Component, Path};

/// Splits a folder specification into lowercase segments.
///
/// # Example
///
/// ```ignore
/// assert_eq!(folder_segments("Core\\Interfaces/"), vec!["core", "interfaces"]);
/// ```
#[must_use]
pub fn folder_segments(folder: &str) -> Vec<String> {
    folder
        .split(['/', '\\'])
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != ".")
        .map(str::to_lowercase)
        .collect()
}

/// Returns the lowercase directory segments of a file path (file name excluded).
#[must_use]
pub fn directory_segments(file: &Path) -> Vec<String> {
    let Some(parent) = file.parent() else {
        return Vec::new();
    };
    parent
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_lowercase()),
            _ => None,
        })
        .flat_map(|s| folder_segments(&s))
        .collect()
}

/// Checks whether the directory of `file` contains `folder` as a contiguous
/// run of segments.
///
/// # Examples
///
/// ```ignore
/// assert!(dir_contains_folder(Path::new("src/Interfaces/IShape.cs"), "interfaces"));
/// assert!(dir_contains_folder(Path::new("src/Core/Interfaces/IShape.cs"), "Core/Interfaces"));
/// assert!(!dir_contains_folder(Path::new("src/MyInterfaces/IShape.cs"), "Interfaces"));
/// ```
#[must_use]
pub fn dir_contains_folder(file: &Path, folder: &str) -> bool {
    let needle = folder_segments(folder);
    if needle.is_empty() {
        return true;
    }
    let haystack = directory_segments(file);
    haystack
        .windows(needle.len())
        .any(|window| window == needle.as_slice())
}

/// Strips `suffix` from the end of `name`, ignoring ASCII case.
#[must_use]
pub fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    if suffix.is_empty() || name.len() < suffix.len() {
        return None;
    }
    let split = name.len() - suffix.len();
    if !name.is_char_boundary(split) {
        return None;
    }
    let (stem, tail) = name.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(stem)
}
