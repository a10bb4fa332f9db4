//! File set resolution.
//!
//! Targets never touch the filesystem directly; they ask a
//! [`FileResolver`] to expand their patterns into concrete paths.

use std::path::PathBuf;

use anyhow::Result;

use crate::util::fs::glob_files;

/// Expands a path pattern into the files it matches.
pub trait FileResolver {
    /// Resolve `pattern` into a sorted, de-duplicated file list.
    ///
    /// Matching nothing is not an error.
    fn resolve(&self, pattern: &str) -> Result<Vec<PathBuf>>;
}

/// Resolves glob patterns against a project directory.
///
/// Returned paths are relative to the project root, which is also the
/// directory the generated Makefile is run from.
#[derive(Debug, Clone)]
pub struct GlobResolver {
    root: PathBuf,
}

impl GlobResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        GlobResolver { root: root.into() }
    }
}

impl FileResolver for GlobResolver {
    fn resolve(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        glob_files(&self.root, pattern)
    }
}
