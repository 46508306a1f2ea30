//! Utility functions for rule implementations.

pub mod paths;

#[doc(inline)]
pub use paths::{dir_contains_folder, folder_segments, strip_suffix_ignore_case};
